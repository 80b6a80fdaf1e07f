use crate::db::Page;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl From<Pagination> for Page {
    fn from(query: Pagination) -> Self {
        Page::new(query.offset, query.limit)
    }
}
