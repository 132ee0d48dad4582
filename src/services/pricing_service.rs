// src/services/pricing_service.rs

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde_json::json;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, db::ProductRepository, models::products::VariantPrice};

/// Authoritative prices for a batch of variants, keyed by variant id.
#[derive(Debug, Clone, Default)]
pub struct ResolvedPrices {
    prices: HashMap<Uuid, VariantPrice>,
}

impl ResolvedPrices {
    fn get(&self, variant_id: Uuid) -> Option<&VariantPrice> {
        self.prices.get(&variant_id)
    }

    /// An explicit override wins over the stored sell price.
    pub fn effective_unit_price(&self, variant_id: Uuid, unit_price: Option<Decimal>) -> Option<Decimal> {
        match unit_price {
            Some(price) => Some(price),
            None => self.get(variant_id).map(|p| p.sell_price),
        }
    }
}

#[derive(Clone)]
pub struct PricingService {
    product_repo: ProductRepository,
}

impl PricingService {
    pub fn new(product_repo: ProductRepository) -> Self {
        Self { product_repo }
    }

    /// One batch lookup for every distinct id. Fails with `VARIANT_NOT_FOUND`
    /// naming the first id (in request order) that is unknown, soft-deleted or
    /// owned by another company.
    pub async fn resolve<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        variant_ids: &[Uuid],
    ) -> Result<ResolvedPrices, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let distinct = distinct_ids(variant_ids);
        let found = self
            .product_repo
            .find_variant_prices(executor, company_id, &distinct)
            .await?;

        index_prices(&distinct, found)
    }
}

/// Removes duplicates, keeping the first occurrence of each id.
pub fn distinct_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

pub(crate) fn index_prices(requested: &[Uuid], found: Vec<VariantPrice>) -> Result<ResolvedPrices, AppError> {
    let prices: HashMap<Uuid, VariantPrice> = found.into_iter().map(|p| (p.id, p)).collect();

    if let Some(missing) = requested.iter().find(|id| !prices.contains_key(id)) {
        tracing::warn!(variant_id = %missing, code = "VARIANT_NOT_FOUND", "unknown variant referenced");
        return Err(AppError::business_with(
            "VARIANT_NOT_FOUND",
            format!("Variant not found: {missing}"),
            json!({ "variantId": missing }),
        ));
    }

    Ok(ResolvedPrices { prices })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(id: Uuid, sell: i64) -> VariantPrice {
        VariantPrice { id, sell_price: Decimal::from(sell), cost_price: Decimal::from(sell / 2) }
    }

    #[test]
    fn distinct_ids_keeps_first_occurrence_order() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(distinct_ids(&[b, a, b, a]), vec![b, a]);
    }

    #[test]
    fn override_takes_precedence_over_sell_price() {
        let id = Uuid::new_v4();
        let prices = index_prices(&[id], vec![price(id, 15000)]).unwrap();

        assert_eq!(prices.effective_unit_price(id, None), Some(Decimal::from(15000)));
        assert_eq!(
            prices.effective_unit_price(id, Some(Decimal::from(12000))),
            Some(Decimal::from(12000))
        );
        // A zero override is still an explicit price
        assert_eq!(prices.effective_unit_price(id, Some(Decimal::ZERO)), Some(Decimal::ZERO));
    }

    #[test]
    fn missing_variant_is_reported_with_its_id() {
        let (known, unknown) = (Uuid::new_v4(), Uuid::new_v4());

        let err = index_prices(&[known, unknown], vec![price(known, 10)]).unwrap_err();

        assert_eq!(err.code(), "VARIANT_NOT_FOUND");
        assert_eq!(err.details().unwrap()["variantId"], json!(unknown));
        assert_eq!(err.kind(), crate::common::error::ErrorKind::Validation);
    }
}
