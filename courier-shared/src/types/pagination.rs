use serde::{Deserialize, Serialize};

/// Zero-based page request, mirroring the query parameters of the
/// versioned list endpoints (`?page=0&size=20`).
#[derive(Debug, Clone, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_size")]
    pub size: u64,
}

fn default_size() -> u64 {
    20
}

impl PageParams {
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.limit())
    }

    pub fn limit(&self) -> u64 {
        self.size.clamp(1, 100)
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self { page: 0, size: 20 }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T: Serialize> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub size: u64,
    pub total_pages: u64,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, params: &PageParams) -> Self {
        let size = params.limit();
        let total_pages = if total == 0 { 0 } else { (total + size - 1) / size };
        Self {
            items,
            total,
            page: params.page,
            size,
            total_pages,
        }
    }
}
