use std::sync::Arc;

use anyhow::Context;

use crate::config::AppConfig;
use crate::marketplace::{Product, load_products};
use crate::upstream::UpstreamClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub upstream: UpstreamClient,
    pub products: Arc<Vec<Product>>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let upstream = UpstreamClient::new(&config)?;
        let products = load_products(&config.products_path())
            .context("failed to load product catalogue")?;
        Ok(Self {
            config,
            upstream,
            products: Arc::new(products),
        })
    }
}
