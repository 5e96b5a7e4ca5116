use crate::maud_conveniences::error_banner;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use snafu::Snafu;
use std::num::ParseIntError;

pub type GradebookResult<T> = Result<T, GradebookError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum GradebookError {
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse URL {:?}", original))]
    ParseUrl {
        source: url::ParseError,
        original: String,
    },
    #[snafu(display("{:?} cannot be used as a base URL for the grades API", original))]
    NotABaseUrl { original: String },
    #[snafu(display("Unable to build HTTP client"))]
    BuildClient { source: reqwest::Error },
    #[snafu(display("Error reaching the grades API ({} {})", method, url))]
    SendRequest {
        source: reqwest::Error,
        method: &'static str,
        url: String,
    },
    #[snafu(display("Error reading the grades API response from {}", url))]
    ReadBody { source: reqwest::Error, url: String },
    #[snafu(display("Request failed with status code {}{}", status.as_u16(), fmt_api_message(message)))]
    ApiStatus {
        status: StatusCode,
        method: &'static str,
        url: String,
        message: String,
    },
    #[snafu(display("Unable to understand the grades API response from {}", url))]
    DecodeJson {
        source: serde_json::Error,
        url: String,
    },
    #[snafu(display("Score must be a number"))]
    ScoreNotANumber { original: String },
    #[snafu(display("Score must be between 0 and 100, found {}", score))]
    ScoreOutOfRange { score: i32 },
    #[snafu(display("Student ID must be a number, found {:?}", original))]
    ParseStudentId {
        source: ParseIntError,
        original: String,
    },
    #[snafu(display("Invalid email address"))]
    Email { source: email_address::Error },
    #[snafu(display("{} must not be empty", field))]
    EmptyField { field: &'static str },
    #[snafu(display("Cannot unregister from a compulsory module!"))]
    CompulsoryModuleForStudent { code: String },
    #[snafu(display("Cannot unregister students from a compulsory module!"))]
    CompulsoryModuleForModule { code: String },
    #[snafu(display("Student not found"))]
    MissingStudent { id: i64 },
    #[snafu(display("Module not found"))]
    MissingModule { code: String },
    #[snafu(display("Grade not found"))]
    MissingGrade { id: i64 },
    #[snafu(display("Student {} is not registered for {}", id, code))]
    NotRegistered { id: i64, code: String },
    #[snafu(display("Error with CSVs"))]
    Csv { source: csv::Error },
    #[snafu(display("Error finishing CSV export"))]
    CsvFlush { source: std::io::Error },
    #[snafu(display("Error adding fake data"))]
    SeedSampleData {
        #[snafu(source(from(GradebookError, Box::new)))]
        source: Box<GradebookError>,
    },
}

fn fmt_api_message(message: &str) -> String {
    if message.trim().is_empty() {
        String::new()
    } else {
        format!(": {}", message.trim())
    }
}

impl GradebookError {
    #[allow(clippy::match_same_arms)]
    pub fn status_code(&self) -> StatusCode {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input
        const BG: StatusCode = StatusCode::BAD_GATEWAY; //api misbehaved

        match self {
            Self::BadEnvVar { .. } | Self::ParseUrl { .. } | Self::NotABaseUrl { .. } => ISE,
            Self::BuildClient { .. } => ISE,
            Self::SendRequest { .. } | Self::ReadBody { .. } | Self::DecodeJson { .. } => BG,
            Self::ApiStatus { status, .. } if *status == StatusCode::NOT_FOUND => NF,
            Self::ApiStatus { status, .. } if *status == StatusCode::BAD_REQUEST => BI,
            Self::ApiStatus { .. } => BG,
            Self::ScoreNotANumber { .. } | Self::ScoreOutOfRange { .. } => BI,
            Self::ParseStudentId { .. } | Self::Email { .. } | Self::EmptyField { .. } => BI,
            Self::CompulsoryModuleForStudent { .. } | Self::CompulsoryModuleForModule { .. } => BI,
            Self::MissingStudent { .. } | Self::MissingModule { .. } => NF,
            Self::MissingGrade { .. } => NF,
            Self::NotRegistered { .. } => NF,
            Self::Csv { .. } | Self::CsvFlush { .. } => ISE,
            Self::SeedSampleData { source } => source.status_code(),
        }
    }
}

impl IntoResponse for GradebookError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        error!(?self, "Error!");
        (
            status_code,
            [("HX-Retarget", "#error_banner"), ("HX-Reswap", "innerHTML")],
            Html(error_banner(self.to_string())),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn validation_errors_become_bad_request_banners() {
        let response = GradebookError::ScoreNotANumber {
            original: "ninety".into(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["HX-Retarget"], "#error_banner");
        assert!(body_text(response).await.contains("Score must be a number"));
    }

    #[test]
    fn api_statuses_map_through() {
        let rejected = GradebookError::ApiStatus {
            status: StatusCode::BAD_REQUEST,
            method: "POST",
            url: "http://api/registrations".into(),
            message: "This registration already exists.".into(),
        };
        assert_eq!(rejected.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            rejected.to_string(),
            "Request failed with status code 400: This registration already exists."
        );

        let broken = GradebookError::ApiStatus {
            status: StatusCode::SERVICE_UNAVAILABLE,
            method: "GET",
            url: "http://api/students".into(),
            message: String::new(),
        };
        assert_eq!(broken.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(broken.to_string(), "Request failed with status code 503");
    }

    #[test]
    fn seeding_failures_share_one_message() {
        let error = GradebookError::SeedSampleData {
            source: Box::new(GradebookError::MissingModule {
                code: "COMP0010".into(),
            }),
        };
        assert_eq!(error.to_string(), "Error adding fake data");
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }
}
