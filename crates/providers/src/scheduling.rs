//! Client for the hosted scheduling provider (Cal.com v2 bookings API).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::Result;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};
use tutorbook_core::{
    errors::ProviderError,
    ports::{ScheduleRequest, ScheduledBooking, SchedulingProvider},
};

use crate::{
    config::SchedulingConfig,
    http::{build_client, check_status, read_json, unreachable},
};

const API_VERSION_HEADER: &str = "cal-api-version";
const API_VERSION: &str = "2024-08-13";

pub struct HttpSchedulingClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct BookingData {
    uid: String,
    start: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Attendee<'a> {
    name: &'a str,
    email: &'a str,
    time_zone: &'a str,
    language: &'a str,
}

/// Body of `POST /v2/bookings`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingBody<'a> {
    start: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    event_type_id: Option<i64>,
    attendee: Attendee<'a>,
    booking_fields_responses: serde_json::Value,
}

impl<'a> CreateBookingBody<'a> {
    pub fn from_request(request: &'a ScheduleRequest) -> Self {
        Self {
            start: request.start.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            event_type_id: request.event_type_id,
            attendee: Attendee {
                name: &request.name,
                email: &request.email,
                time_zone: &request.time_zone,
                language: &request.locale,
            },
            booking_fields_responses: json!({ "notes": request.notes }),
        }
    }
}

impl HttpSchedulingClient {
    pub fn new(config: &SchedulingConfig, timeout: std::time::Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn post(&self, path: &str) -> Result<RequestBuilder, ProviderError> {
        let key = self.api_key.as_deref().ok_or_else(|| {
            ProviderError::Misconfigured("SCHEDULING_API_KEY is not set".to_string())
        })?;

        Ok(self
            .client
            .post(format!("{}{}", self.api_url, path))
            .bearer_auth(key)
            .header(API_VERSION_HEADER, API_VERSION))
    }

    fn booking_path(uid: &str, action: &str) -> String {
        format!("/v2/bookings/{}/{}", urlencoding::encode(uid), action)
    }
}

#[async_trait]
impl SchedulingProvider for HttpSchedulingClient {
    async fn create_booking(
        &self,
        request: &ScheduleRequest,
    ) -> std::result::Result<ScheduledBooking, ProviderError> {
        debug!("Creating remote booking at {}", request.start);

        let response = self
            .post("/v2/bookings")?
            .json(&CreateBookingBody::from_request(request))
            .send()
            .await
            .map_err(unreachable)?;

        let created: Envelope<BookingData> = read_json(response).await.inspect_err(|e| {
            error!("Scheduling provider refused booking: {}", e);
        })?;

        Ok(ScheduledBooking {
            id: created.data.uid,
            start: created.data.start,
        })
    }

    async fn cancel_booking(
        &self,
        booking_id: &str,
        reason: &str,
    ) -> std::result::Result<(), ProviderError> {
        debug!("Cancelling remote booking {}", booking_id);

        let response = self
            .post(&Self::booking_path(booking_id, "cancel"))?
            .json(&json!({ "cancellationReason": reason }))
            .send()
            .await
            .map_err(unreachable)?;

        check_status(response).await?;
        Ok(())
    }

    async fn reschedule_booking(
        &self,
        booking_id: &str,
        start: DateTime<Utc>,
        time_zone: &str,
    ) -> std::result::Result<ScheduledBooking, ProviderError> {
        debug!("Rescheduling remote booking {} to {} ({})", booking_id, start, time_zone);

        let response = self
            .post(&Self::booking_path(booking_id, "reschedule"))?
            .json(&json!({
                "start": start.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            }))
            .send()
            .await
            .map_err(unreachable)?;

        let moved: Envelope<BookingData> = read_json(response).await?;

        Ok(ScheduledBooking {
            id: moved.data.uid,
            start: moved.data.start,
        })
    }
}
