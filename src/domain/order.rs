use chrono::NaiveDateTime;
use pushkind_common::pagination::Pagination;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Operational state of an order as it moves through the kitchen.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order was sent by the table and awaits acceptance.
    #[default]
    Placed,
    /// Staff acknowledged the order.
    Accepted,
    /// Kitchen is preparing the order.
    Preparing,
    /// Food is ready to be served.
    Ready,
    /// Food reached the table.
    Served,
    /// Order is settled and closed.
    Done,
    /// Order was cancelled.
    Cancelled,
}

impl From<&str> for OrderStatus {
    fn from(value: &str) -> Self {
        match value {
            "accepted" => Self::Accepted,
            "preparing" => Self::Preparing,
            "ready" => Self::Ready,
            "served" => Self::Served,
            "done" => Self::Done,
            "cancelled" => Self::Cancelled,
            _ => Self::Placed,
        }
    }
}

impl From<OrderStatus> for &'static str {
    fn from(value: OrderStatus) -> Self {
        match value {
            OrderStatus::Placed => "placed",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Served => "served",
            OrderStatus::Done => "done",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

/// Payment state shared by orders and bills.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
}

impl From<&str> for PaymentStatus {
    fn from(value: &str) -> Self {
        match value {
            "paid" => Self::Paid,
            _ => Self::Unpaid,
        }
    }
}

impl From<PaymentStatus> for &'static str {
    fn from(value: PaymentStatus) -> Self {
        match value {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
        }
    }
}

/// Kitchen state of a single order line.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderItemStatus {
    #[default]
    Placed,
    Preparing,
    Ready,
    Served,
    Cancelled,
}

impl From<&str> for OrderItemStatus {
    fn from(value: &str) -> Self {
        match value {
            "preparing" => Self::Preparing,
            "ready" => Self::Ready,
            "served" => Self::Served,
            "cancelled" => Self::Cancelled,
            _ => Self::Placed,
        }
    }
}

impl From<OrderItemStatus> for &'static str {
    fn from(value: OrderItemStatus) -> Self {
        match value {
            OrderItemStatus::Placed => "placed",
            OrderItemStatus::Preparing => "preparing",
            OrderItemStatus::Ready => "ready",
            OrderItemStatus::Served => "served",
            OrderItemStatus::Cancelled => "cancelled",
        }
    }
}

/// Line of an order, priced at the moment it was ordered.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Row identifier of the line.
    pub id: i32,
    /// Catalog item identifier, when the ordering flow recorded one.
    pub item_id: Option<i32>,
    /// Menu entry identifier used by older ordering clients.
    pub menu_item_id: Option<i32>,
    /// Display name captured at order time.
    pub name: String,
    /// Ordered quantity.
    pub quantity: i32,
    /// Unit price snapshot.
    pub price: Option<Decimal>,
    /// Unit price recorded by older ordering clients.
    pub price_at_order: Option<Decimal>,
    /// Selected modifiers.
    pub modifiers: Vec<String>,
    /// Free-form kitchen notes.
    pub notes: Option<String>,
    /// Kitchen state of the line.
    pub status: OrderItemStatus,
    /// Timestamp for when the line was added.
    pub created_at: NaiveDateTime,
}

/// Tax applied to an order, mirrored from the bill breakdown.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppliedTax {
    /// Normalized uppercase code derived from the tax name.
    pub code: String,
    /// Display name of the tax.
    pub name: String,
    /// Tax rate in percent.
    pub rate: Decimal,
    /// Computed tax amount.
    pub amount: Decimal,
}

/// Domain representation of a table order belonging to a hub.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique identifier of the order.
    pub id: i32,
    /// Owning hub identifier.
    pub hub_id: i32,
    /// Table the order was placed from.
    pub table_id: Option<i32>,
    /// Denormalized table number.
    pub table_number: Option<String>,
    /// Dining session the order belongs to.
    pub session_id: String,
    /// Ordered lines.
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub service_charge_amount: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    /// Discount percent applied upstream, if any.
    pub applied_discount_percent: Option<Decimal>,
    /// Service-charge percent applied upstream, if any.
    pub applied_service_charge_percent: Option<Decimal>,
    /// Tax breakdown mirrored from the latest bill.
    pub applied_taxes: Vec<AppliedTax>,
    /// Operational state of the order.
    pub status: OrderStatus,
    /// Payment state of the order.
    pub payment_status: PaymentStatus,
    /// Whether the order is closed for further service.
    pub is_completed: bool,
    /// Optimistic concurrency token.
    #[serde(skip)]
    pub version: i32,
    /// Timestamp for when the order record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the order record.
    pub updated_at: NaiveDateTime,
}

/// Line payload written when inserting or replacing order items.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub item_id: Option<i32>,
    pub menu_item_id: Option<i32>,
    pub name: String,
    pub quantity: i32,
    pub price: Option<Decimal>,
    pub price_at_order: Option<Decimal>,
    pub modifiers: Vec<String>,
    pub notes: Option<String>,
    pub status: OrderItemStatus,
    /// Original creation time to preserve, `None` for "now".
    pub created_at: Option<NaiveDateTime>,
}

impl NewOrderItem {
    /// Build a catalog line with the given quantity and unit price.
    pub fn new(item_id: i32, name: impl Into<String>, quantity: i32, price: Decimal) -> Self {
        Self {
            item_id: Some(item_id),
            menu_item_id: None,
            name: name.into(),
            quantity,
            price: Some(price),
            price_at_order: None,
            modifiers: Vec::new(),
            notes: None,
            status: OrderItemStatus::default(),
            created_at: None,
        }
    }

    /// Override the kitchen state of the line.
    pub fn with_status(mut self, status: OrderItemStatus) -> Self {
        self.status = status;
        self
    }
}

/// Payload required to insert a new order for a hub.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub hub_id: i32,
    pub table_id: Option<i32>,
    pub table_number: Option<String>,
    pub session_id: String,
    pub items: Vec<NewOrderItem>,
    pub applied_discount_percent: Option<Decimal>,
    pub applied_service_charge_percent: Option<Decimal>,
    pub status: OrderStatus,
    pub updated_at: NaiveDateTime,
}

impl NewOrder {
    /// Build a new order payload for a dining session with the current timestamp.
    pub fn new(hub_id: i32, session_id: impl Into<String>) -> Self {
        let now = chrono::Local::now().naive_utc();
        Self {
            hub_id,
            table_id: None,
            table_number: None,
            session_id: session_id.into(),
            items: Vec::new(),
            applied_discount_percent: None,
            applied_service_charge_percent: None,
            status: OrderStatus::default(),
            updated_at: now,
        }
    }

    /// Attach the table the order was placed from.
    pub fn with_table(mut self, table_id: i32, table_number: Option<String>) -> Self {
        self.table_id = Some(table_id);
        self.table_number = table_number;
        self
    }

    /// Append an ordered line.
    pub fn with_item(mut self, item: NewOrderItem) -> Self {
        self.items.push(item);
        self
    }

    /// Record discount and service-charge percentages applied upstream.
    pub fn with_applied_percentages(
        mut self,
        discount_percent: Decimal,
        service_charge_percent: Decimal,
    ) -> Self {
        self.applied_discount_percent = Some(discount_percent);
        self.applied_service_charge_percent = Some(service_charge_percent);
        self
    }

    /// Override the default status for the new order.
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }
}

/// Full overwrite of an order's items and money from bill state.
///
/// Applied only when the stored order still carries `expected_version`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderMirror {
    pub order_id: i32,
    pub hub_id: i32,
    pub expected_version: i32,
    pub items: Vec<NewOrderItem>,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub service_charge_amount: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub applied_discount_percent: Option<Decimal>,
    pub applied_service_charge_percent: Option<Decimal>,
    pub applied_taxes: Vec<AppliedTax>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub is_completed: bool,
    pub updated_at: NaiveDateTime,
}

/// Query definition used to list orders for a hub.
#[derive(Debug, Clone)]
pub struct OrderListQuery {
    /// Owning hub identifier.
    pub hub_id: i32,
    /// Optional table filter.
    pub table_id: Option<i32>,
    /// Optional dining session filter.
    pub session_id: Option<String>,
    /// Optional status filter.
    pub status: Option<OrderStatus>,
    /// Optional pagination options applied to the query.
    pub pagination: Option<Pagination>,
}

impl OrderListQuery {
    /// Construct a query that targets all orders belonging to `hub_id`.
    pub fn new(hub_id: i32) -> Self {
        Self {
            hub_id,
            table_id: None,
            session_id: None,
            status: None,
            pagination: None,
        }
    }

    /// Filter the results by table.
    pub fn table_id(mut self, table_id: i32) -> Self {
        self.table_id = Some(table_id);
        self
    }

    /// Filter the results by dining session.
    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Filter the results by the provided status.
    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Apply pagination to the query with the given page number and page size.
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
