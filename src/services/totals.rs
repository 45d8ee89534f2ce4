//! Bill totals computation.
//!
//! Every intermediate amount is rounded to cents before it is used in the
//! next step, so stored fields always add up under the same rounding rule.
//! Malformed numbers never fail the computation: quantities below one count
//! as one, negative prices, extras and percentages count as zero. The only
//! failure is an amount too large to be stored.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::bill::{BillExtra, BillItem, BillTotals, TaxLine};
use crate::domain::money::round_money;
use crate::domain::pricing::TaxRule;

/// Largest amount any computed field may reach: 10^15 currency units.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TotalsError {
    #[error("amount out of range while computing {0}")]
    Overflow(&'static str),
}

/// Percentages and fixed discount applied on top of the bill lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TotalsOptions {
    pub discount_percent: Decimal,
    pub service_charge_percent: Decimal,
    /// Sum of fixed-amount discounts, applied after the percentage discount.
    pub additional_discount_amount: Decimal,
}

fn bounded(value: Decimal, step: &'static str) -> Result<Decimal, TotalsError> {
    if value.abs() > MAX_AMOUNT {
        return Err(TotalsError::Overflow(step));
    }
    Ok(value)
}

fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

fn add(left: Decimal, right: Decimal, step: &'static str) -> Result<Decimal, TotalsError> {
    let sum = left.checked_add(right).ok_or(TotalsError::Overflow(step))?;
    bounded(round_money(sum), step)
}

/// `round(base * numerator / denominator)`
fn share(
    base: Decimal,
    numerator: Decimal,
    denominator: Decimal,
    step: &'static str,
) -> Result<Decimal, TotalsError> {
    let value = base
        .checked_mul(numerator)
        .and_then(|product| product.checked_div(denominator))
        .ok_or(TotalsError::Overflow(step))?;
    bounded(round_money(value), step)
}

fn line_total(items: &[BillItem]) -> Result<Decimal, TotalsError> {
    items.iter().try_fold(Decimal::ZERO, |acc, item| {
        let quantity = Decimal::from(item.quantity.max(1));
        let price = non_negative(item.price);
        let amount = price
            .checked_mul(quantity)
            .ok_or(TotalsError::Overflow("line total"))?;
        let sum = acc
            .checked_add(amount)
            .ok_or(TotalsError::Overflow("line total"))?;
        bounded(sum, "line total")
    })
}

fn extras_total(extras: &[BillExtra]) -> Result<Decimal, TotalsError> {
    extras.iter().try_fold(Decimal::ZERO, |acc, extra| {
        let sum = acc
            .checked_add(non_negative(extra.amount))
            .ok_or(TotalsError::Overflow("extras total"))?;
        bounded(sum, "extras total")
    })
}

/// Compute the full breakdown for a bill.
///
/// Inclusive taxes are reported in the breakdown and in
/// `inclusive_tax_amount` but are already part of the prices, so they are
/// not added to `total`.
pub fn compute_totals(
    items: &[BillItem],
    extras: &[BillExtra],
    taxes: &[TaxRule],
    options: &TotalsOptions,
) -> Result<BillTotals, TotalsError> {
    let discount_percent = non_negative(options.discount_percent);
    let service_charge_percent = non_negative(options.service_charge_percent);
    let additional_discount = non_negative(options.additional_discount_amount);

    let subtotal = round_money(line_total(items)?);
    let extras_total = round_money(extras_total(extras)?);
    let subtotal_with_extras = add(subtotal, extras_total, "subtotal")?;

    let percent_discount = share(
        subtotal_with_extras,
        discount_percent,
        Decimal::ONE_HUNDRED,
        "discount",
    )?;
    let discount_amount =
        add(percent_discount, additional_discount, "discount")?.min(subtotal_with_extras);
    let amount_after_discount = round_money(subtotal_with_extras - discount_amount);

    let mut tax_breakdown = Vec::with_capacity(taxes.len());
    let mut tax_amount = Decimal::ZERO;
    let mut inclusive_tax_amount = Decimal::ZERO;

    for tax in taxes {
        let rate = non_negative(tax.percent);
        let amount = if tax.inclusive {
            let denominator = Decimal::ONE_HUNDRED
                .checked_add(rate)
                .ok_or(TotalsError::Overflow("tax"))?;
            let amount = share(amount_after_discount, rate, denominator, "tax")?;
            inclusive_tax_amount = add(inclusive_tax_amount, amount, "tax")?;
            amount
        } else {
            let amount = share(amount_after_discount, rate, Decimal::ONE_HUNDRED, "tax")?;
            tax_amount = add(tax_amount, amount, "tax")?;
            amount
        };

        tax_breakdown.push(TaxLine {
            name: tax.name.clone(),
            rate,
            inclusive: tax.inclusive,
            amount,
        });
    }

    let service_charge_amount = share(
        amount_after_discount,
        service_charge_percent,
        Decimal::ONE_HUNDRED,
        "service charge",
    )?;

    let total = add(
        add(amount_after_discount, tax_amount, "total")?,
        service_charge_amount,
        "total",
    )?;

    Ok(BillTotals {
        subtotal,
        extras_total,
        subtotal_with_extras,
        discount_percent,
        discount_amount,
        amount_after_discount,
        tax_breakdown,
        tax_amount,
        inclusive_tax_amount,
        service_charge_percent,
        service_charge_amount,
        total,
    })
}
