use basket_optimizer_sdk::{
    MultiStoreRequest, OptimizerClient, RankedStoresResult, Result, SingleStoreRequest,
    TopMultiStoreSolutionsResult,
};

/// Common interface for optimization backends
pub trait OptimizationBackend {
    /// Rank individual stores for a list
    ///
    /// # Returns
    /// Candidate stores, best first, each with its covered and missing items
    async fn optimize_single_store(&self, request: &SingleStoreRequest)
        -> Result<RankedStoresResult>;

    /// Find the cheapest ways to split a list across stores
    ///
    /// # Returns
    /// Solutions, best first
    async fn optimize_multi_store(
        &self,
        request: &MultiStoreRequest,
    ) -> Result<TopMultiStoreSolutionsResult>;

    /// Backend name for logging/debugging
    fn name(&self) -> &str;
}

impl OptimizationBackend for OptimizerClient {
    async fn optimize_single_store(
        &self,
        request: &SingleStoreRequest,
    ) -> Result<RankedStoresResult> {
        OptimizerClient::optimize_single_store(self, request).await
    }

    async fn optimize_multi_store(
        &self,
        request: &MultiStoreRequest,
    ) -> Result<TopMultiStoreSolutionsResult> {
        OptimizerClient::optimize_multi_store(self, request).await
    }

    fn name(&self) -> &str {
        self.base_url().as_str()
    }
}
