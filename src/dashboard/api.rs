use serde::Serialize;
use time::Date;
use tracing::instrument;

use super::dto::{DailySummary, InsightsResponse, MonthlySummary, ProgressData, WeeklySummary};
use crate::{
    client::{ApiClient, ApiError},
    formats::format_date,
};

#[derive(Serialize)]
struct DaysQuery {
    days: u32,
}

#[derive(Serialize)]
struct MonthQuery {
    year: i32,
    month: u8,
}

impl ApiClient {
    #[instrument(skip(self))]
    pub async fn today_summary(&self) -> Result<DailySummary, ApiError> {
        self.get("/dashboard/summary").await
    }

    #[instrument(skip(self))]
    pub async fn daily_summary(&self, date: Date) -> Result<DailySummary, ApiError> {
        self.get(&format!("/dashboard/summary/{}", format_date(date)))
            .await
    }

    #[instrument(skip(self))]
    pub async fn weekly_summary(&self) -> Result<WeeklySummary, ApiError> {
        self.get("/dashboard/weekly-summary").await
    }

    #[instrument(skip(self))]
    pub async fn monthly_summary(&self, year: i32, month: u8) -> Result<MonthlySummary, ApiError> {
        self.get_with("/dashboard/monthly-summary", &MonthQuery { year, month })
            .await
    }

    #[instrument(skip(self))]
    pub async fn progress_data(&self, days: u32) -> Result<ProgressData, ApiError> {
        self.get_with("/dashboard/progress", &DaysQuery { days })
            .await
    }

    #[instrument(skip(self))]
    pub async fn insights(&self) -> Result<InsightsResponse, ApiError> {
        self.get("/dashboard/insights").await
    }
}
