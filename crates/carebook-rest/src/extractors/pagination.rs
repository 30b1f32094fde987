//! Patient listing query parameters.

use carebook_core::{PatientFilter, PatientQuery};
use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters for listing patients.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PatientListQuery {
    /// Case-insensitive name fragment, matched literally.
    #[serde(default)]
    pub name: Option<String>,
    /// Page size, 1-100. Defaults to 20.
    #[serde(default)]
    pub limit: Option<u32>,
    /// Records to skip.
    #[serde(default)]
    pub offset: Option<u64>,
}

impl From<PatientListQuery> for PatientQuery {
    fn from(query: PatientListQuery) -> Self {
        PatientQuery::new(query.name, query.limit, query.offset)
    }
}

/// Query parameters for counting patients.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PatientCountQuery {
    /// Case-insensitive name fragment, matched literally.
    #[serde(default)]
    pub name: Option<String>,
}

impl From<PatientCountQuery> for PatientFilter {
    fn from(query: PatientCountQuery) -> Self {
        PatientFilter { name: query.name }
    }
}
