//! Page selection for task listings.
//!
//! Pages are 1-indexed. A missing or zero `page` selects the first page and a
//! missing or zero `limit` selects the configured default page size; larger
//! limits are clamped to the configured maximum.

use serde::Serialize;

use crate::config::PaginationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn resolve(page: Option<u32>, limit: Option<u32>, config: &PaginationConfig) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(config.default_limit)
            .min(config.max_limit);

        Self { page, limit }
    }

    /// Number of records to skip
    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.limit as usize)
    }

    pub fn limit(&self) -> usize {
        self.limit as usize
    }
}
