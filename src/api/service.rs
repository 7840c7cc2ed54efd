//! Shared business logic for the dashboard API
//!
//! This service layer is used by both the REST handlers and the terminal reports.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::DatasetCache;
use crate::dashboard::{
    build_analysis, build_comparison, filter_options, records_newest_first, summarize,
    AnalysisQuery, AnalysisView, ComparisonQuery, ComparisonView, DataSummary, FilterOptions,
};
use crate::models::Appointment;
use crate::source::DataSource;

pub struct DashboardService<S> {
    cache: DatasetCache<S>,
}

impl<S: DataSource> DashboardService<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            cache: DatasetCache::new(source, ttl),
        }
    }

    /// Current table; a failed load means no data for this request.
    pub async fn dataset(&self) -> Result<Arc<Vec<Appointment>>> {
        self.cache.get().await.context("no data available")
    }

    pub async fn get_options(&self) -> Result<FilterOptions> {
        let records = self.dataset().await?;
        Ok(filter_options(&records))
    }

    pub async fn get_analysis(&self, query: &AnalysisQuery) -> Result<AnalysisView> {
        let records = self.dataset().await?;
        Ok(build_analysis(&records, query))
    }

    pub async fn get_comparison(&self, query: &ComparisonQuery) -> Result<ComparisonView> {
        let records = self.dataset().await?;
        Ok(build_comparison(&records, query))
    }

    pub async fn get_summary(&self) -> Result<DataSummary> {
        let records = self.dataset().await?;
        Ok(summarize(&records))
    }

    pub async fn get_records(&self, limit: Option<usize>) -> Result<Vec<Appointment>> {
        let records = self.dataset().await?;
        Ok(records_newest_first(&records, limit))
    }
}
