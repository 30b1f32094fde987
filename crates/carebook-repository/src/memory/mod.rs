//! Process-local repository backend.
//!
//! Records live in lock-guarded ordered maps, so a single instance can be
//! shared across request tasks. Nothing survives a restart.

mod address_repository;
mod patient_repository;

pub use address_repository::MemoryAddressRepository;
pub use patient_repository::MemoryPatientRepository;

/// Converts a page offset into a slice offset, saturating on overflow.
fn saturating_offset(offset: u64) -> usize {
    usize::try_from(offset).unwrap_or(usize::MAX)
}

#[cfg(test)]
pub(crate) mod test_support {
    use carebook_core::{Patient, PatientId};
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    /// Builds a patient whose `created_at` is `minutes` after a fixed epoch.
    pub fn patient(id: &str, name: &str, phone: &str, minutes: i64) -> Patient {
        let mut patient = Patient::new(
            PatientId::parse(id).unwrap(),
            name,
            NaiveDate::from_ymd_opt(1985, 6, 15).unwrap(),
            phone,
            "CA",
        )
        .unwrap();
        patient.created_at =
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes);
        patient
    }
}
