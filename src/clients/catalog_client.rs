use tracing::{debug, instrument};

use crate::actor_framework::{MissingPolicy, ResourceClient};
use crate::domain::{Product, ProductFields, ProductId};
use crate::product_actor::{
    query, CatalogError, CatalogQuery, ProductAction, ProductActionResult, StockThresholds,
};

/// Client for the catalog store actor.
#[derive(Clone)]
pub struct CatalogClient {
    inner: ResourceClient<Product>,
}

impl_resource_client!(CatalogClient, Product, CatalogError, product);

impl CatalogClient {
    #[instrument(skip(self))]
    pub async fn create_product(&self, fields: ProductFields) -> Result<Product, CatalogError> {
        debug!("Sending request");
        self.inner.create(fields).await
    }

    /// Full replace of every field except the id.
    #[instrument(skip(self))]
    pub async fn update_product(&self, id: ProductId, fields: ProductFields) -> Result<Product, CatalogError> {
        debug!("Sending request");
        self.inner.update(id, fields).await
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), CatalogError> {
        debug!("Sending request");
        self.inner.delete(id).await
    }

    /// Looks up the product a scanned barcode belongs to.
    #[instrument(skip(self))]
    pub async fn get_product_by_barcode(&self, barcode: &str) -> Result<Product, CatalogError> {
        debug!("Sending request");
        let code = barcode.trim();
        self.inner
            .list()
            .await?
            .into_iter()
            .find(|p| p.barcode == code)
            .ok_or_else(|| CatalogError::BarcodeNotFound(code.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn check_stock(&self, id: ProductId) -> Result<u32, CatalogError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::CheckStock).await? {
            ProductActionResult::StockLevel(level) => Ok(level),
            _ => Err(CatalogError::ActorCommunicationError("Unexpected result".to_string())),
        }
    }

    #[instrument(skip(self))]
    pub async fn adjust_stock(&self, id: ProductId, delta: i64) -> Result<Product, CatalogError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::AdjustStock(delta)).await? {
            ProductActionResult::Adjusted(product) => Ok(product),
            _ => Err(CatalogError::ActorCommunicationError("Unexpected result".to_string())),
        }
    }

    /// Takes every `(product, quantity)` out of stock in one step, or nothing.
    ///
    /// # Errors
    /// `Stock` listing every line that could not be covered, or `NotFound`
    /// if a product no longer exists.
    #[instrument(skip(self))]
    pub async fn reserve(&self, lines: &[(ProductId, u32)]) -> Result<Vec<Product>, CatalogError> {
        debug!("Sending request");
        let actions = lines
            .iter()
            .map(|&(id, quantity)| (id, ProductAction::AdjustStock(-i64::from(quantity))))
            .collect();
        let results = self.inner.perform_batch(actions, MissingPolicy::Fail).await?;
        Ok(adjusted(results))
    }

    /// Puts stock back. Products deleted in the meantime are skipped.
    #[instrument(skip(self))]
    pub async fn restock(&self, lines: &[(ProductId, u32)]) -> Result<Vec<Product>, CatalogError> {
        debug!("Sending request");
        let actions = lines
            .iter()
            .map(|&(id, quantity)| (id, ProductAction::AdjustStock(i64::from(quantity))))
            .collect();
        let results = self.inner.perform_batch(actions, MissingPolicy::Skip).await?;
        Ok(adjusted(results))
    }

    #[instrument(skip(self))]
    pub async fn search(&self, catalog_query: &CatalogQuery) -> Result<Vec<Product>, CatalogError> {
        debug!("Sending request");
        let products = self.inner.list().await?;
        Ok(query::search(&products, catalog_query))
    }

    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<String>, CatalogError> {
        debug!("Sending request");
        Ok(query::categories(&self.inner.list().await?))
    }

    #[instrument(skip(self))]
    pub async fn low_stock(&self, thresholds: &StockThresholds) -> Result<Vec<Product>, CatalogError> {
        debug!("Sending request");
        Ok(query::low_stock(&self.inner.list().await?, thresholds))
    }
}

fn adjusted(results: Vec<ProductActionResult>) -> Vec<Product> {
    results
        .into_iter()
        .filter_map(|result| match result {
            ProductActionResult::Adjusted(product) => Some(product),
            _ => None,
        })
        .collect()
}
