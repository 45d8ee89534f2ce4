use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::routes::check_role;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::pricing::{PricingConfig, ResolvedPricing};
use crate::forms::pricing::CreatePricingConfigPayload;
use crate::repository::{PricingReader, PricingWriter};
use crate::services::{ServiceError, ServiceResult};

/// Pricing in effect for `hub_id`.
///
/// The most recently appended active version wins; hubs without one fall
/// back to their legacy settings, and hubs without either get no taxes and
/// zero percentages. Lookup failures are logged and resolve to the zero
/// pricing, never to an error.
pub fn resolve_pricing<R>(repo: &R, hub_id: i32) -> ResolvedPricing
where
    R: PricingReader + ?Sized,
{
    match repo.list_pricing_configs(hub_id) {
        Ok(configs) => {
            if let Some(active) = configs.iter().rev().find(|config| config.active) {
                return ResolvedPricing::from(active);
            }
        }
        Err(err) => {
            log::warn!("Failed to load pricing configs for hub {hub_id}: {err}");
            return ResolvedPricing::default();
        }
    }

    match repo.get_tenant_settings(hub_id) {
        Ok(Some(settings)) => ResolvedPricing::from(&settings),
        Ok(None) => ResolvedPricing::default(),
        Err(err) => {
            log::warn!("Failed to load legacy pricing settings for hub {hub_id}: {err}");
            ResolvedPricing::default()
        }
    }
}

fn authorize_admin(user: &AuthenticatedUser, hub_id: i32) -> ServiceResult<()> {
    if user.hub_id != hub_id || !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    Ok(())
}

/// Lists every pricing version of the hub, oldest first.
pub fn list_pricing_configs<R>(
    repo: &R,
    user: &AuthenticatedUser,
    hub_id: i32,
) -> ServiceResult<Vec<PricingConfig>>
where
    R: PricingReader + ?Sized,
{
    authorize_admin(user, hub_id)?;

    repo.list_pricing_configs(hub_id).map_err(ServiceError::from)
}

/// Appends a pricing version, optionally making it the active one.
pub fn create_pricing_config<R>(
    repo: &R,
    user: &AuthenticatedUser,
    hub_id: i32,
    payload: CreatePricingConfigPayload,
) -> ServiceResult<PricingConfig>
where
    R: PricingWriter + ?Sized,
{
    authorize_admin(user, hub_id)?;

    let new_config = payload
        .into_new_pricing_config(hub_id, Some(user.email.clone()))
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let created = repo
        .create_pricing_config(&new_config)
        .map_err(ServiceError::from)?;

    log::info!(
        "Hub {hub_id} pricing version {} created by {} (active: {})",
        created.version,
        user.email,
        created.active
    );

    Ok(created)
}

/// Activates one pricing version and deactivates all others.
pub fn activate_pricing_config<R>(
    repo: &R,
    user: &AuthenticatedUser,
    hub_id: i32,
    config_id: i32,
) -> ServiceResult<PricingConfig>
where
    R: PricingWriter + ?Sized,
{
    authorize_admin(user, hub_id)?;

    repo.activate_pricing_config(config_id, hub_id)
        .map_err(ServiceError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use pushkind_common::repository::errors::RepositoryError;
    use rust_decimal::Decimal;

    use crate::domain::pricing::{LEGACY_TAX_NAME, TaxRule, TenantSettings};
    use crate::repository::mock::{MockPricingReader, MockPricingWriter};

    fn fixed_datetime() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn user_with_roles(hub_id: i32, roles: &[&str]) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "user-1".to_string(),
            email: "owner@example.com".to_string(),
            hub_id,
            name: "Owner".to_string(),
            roles: roles.iter().map(|role| (*role).to_string()).collect(),
            exp: 0,
        }
    }

    fn config(id: i32, version: i32, active: bool, tax_percent: i64) -> PricingConfig {
        PricingConfig {
            id,
            hub_id: 1,
            version,
            active,
            taxes: vec![TaxRule {
                name: format!("Tax v{version}"),
                percent: Decimal::from(tax_percent),
                inclusive: false,
            }],
            global_discount_percent: Decimal::from(version),
            service_charge_percent: Decimal::from(10),
            created_by: None,
            created_at: fixed_datetime(),
        }
    }

    fn legacy(tax_percent: i64) -> TenantSettings {
        TenantSettings {
            hub_id: 1,
            tax_percent: Decimal::from(tax_percent),
            service_charge_percent: Decimal::from(7),
            discount_percent: Decimal::from(3),
            updated_at: fixed_datetime(),
        }
    }

    #[test]
    fn latest_active_version_wins() {
        let mut repo = MockPricingReader::new();
        repo.expect_list_pricing_configs().returning(|_| {
            Ok(vec![
                config(1, 1, true, 5),
                config(2, 2, false, 8),
                config(3, 3, true, 12),
            ])
        });
        repo.expect_get_tenant_settings().never();

        let resolved = resolve_pricing(&repo, 1);

        assert_eq!(resolved.version, Some(3));
        assert_eq!(resolved.config_id, Some(3));
        assert_eq!(resolved.taxes[0].percent, Decimal::from(12));
        assert_eq!(resolved.global_discount_percent, Decimal::from(3));
    }

    #[test]
    fn falls_back_to_legacy_settings() {
        let mut repo = MockPricingReader::new();
        repo.expect_list_pricing_configs()
            .returning(|_| Ok(vec![config(1, 1, false, 5)]));
        repo.expect_get_tenant_settings()
            .returning(|_| Ok(Some(legacy(9))));

        let resolved = resolve_pricing(&repo, 1);

        assert_eq!(resolved.version, None);
        assert_eq!(resolved.taxes.len(), 1);
        assert_eq!(resolved.taxes[0].name, LEGACY_TAX_NAME);
        assert_eq!(resolved.taxes[0].percent, Decimal::from(9));
        assert_eq!(resolved.service_charge_percent, Decimal::from(7));
        assert_eq!(resolved.global_discount_percent, Decimal::from(3));
    }

    #[test]
    fn legacy_settings_without_tax_yield_no_tax_line() {
        let mut repo = MockPricingReader::new();
        repo.expect_list_pricing_configs().returning(|_| Ok(vec![]));
        repo.expect_get_tenant_settings()
            .returning(|_| Ok(Some(legacy(0))));

        let resolved = resolve_pricing(&repo, 1);

        assert!(resolved.taxes.is_empty());
        assert_eq!(resolved.service_charge_percent, Decimal::from(7));
    }

    #[test]
    fn missing_or_failing_lookups_resolve_to_zero_pricing() {
        let mut repo = MockPricingReader::new();
        repo.expect_list_pricing_configs().returning(|_| Ok(vec![]));
        repo.expect_get_tenant_settings().returning(|_| Ok(None));
        assert_eq!(resolve_pricing(&repo, 1), ResolvedPricing::default());

        let mut failing = MockPricingReader::new();
        failing
            .expect_list_pricing_configs()
            .returning(|_| Err(RepositoryError::NotFound));
        failing.expect_get_tenant_settings().never();
        assert_eq!(resolve_pricing(&failing, 1), ResolvedPricing::default());
    }

    #[test]
    fn management_requires_admin_of_the_same_hub() {
        let repo = MockPricingReader::new();

        let result = list_pricing_configs(&repo, &user_with_roles(1, &[]), 1);
        assert!(matches!(result, Err(ServiceError::Unauthorized)));

        let result = list_pricing_configs(&repo, &user_with_roles(2, &[SERVICE_ACCESS_ROLE]), 1);
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn create_pricing_config_records_author() {
        let mut repo = MockPricingWriter::new();
        repo.expect_create_pricing_config()
            .withf(|new_config| {
                new_config.hub_id == 1
                    && new_config.activate
                    && new_config.created_by.as_deref() == Some("owner@example.com")
            })
            .returning(|_| Ok(config(4, 4, true, 5)));

        let payload: CreatePricingConfigPayload =
            serde_json::from_str(r#"{"taxes": [{"name": "GST", "percent": 5}], "activate": true}"#)
                .unwrap();

        let created = create_pricing_config(
            &repo,
            &user_with_roles(1, &[SERVICE_ACCESS_ROLE]),
            1,
            payload,
        )
        .unwrap();

        assert_eq!(created.version, 4);
    }

    #[test]
    fn invalid_payload_is_a_form_error() {
        let repo = MockPricingWriter::new();
        let payload: CreatePricingConfigPayload =
            serde_json::from_str(r#"{"serviceChargePercent": -1}"#).unwrap();

        let result = create_pricing_config(
            &repo,
            &user_with_roles(1, &[SERVICE_ACCESS_ROLE]),
            1,
            payload,
        );

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }
}
