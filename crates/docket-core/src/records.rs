//! Read-only lookups over citizens and vehicles.

use crate::{
  Error, Result,
  citizen::{Citizen, CitizenRecord, Vehicle},
  lifecycle::SEARCH_LIMIT,
  store::{CaseQuery, RecordStore},
};

/// Citizens whose national id or name contains `text`; `None` when `text`
/// is blank.
pub async fn search_citizens<S: RecordStore>(
  store: &S,
  text: &str,
) -> Result<Option<Vec<Citizen>>> {
  let text = text.trim();
  if text.is_empty() {
    return Ok(None);
  }
  let found = store
    .search_citizens(text.to_owned(), SEARCH_LIMIT)
    .await
    .map_err(Error::store)?;
  Ok(Some(found))
}

/// Vehicles whose plate contains `text`; `None` when `text` is blank.
pub async fn search_vehicles<S: RecordStore>(
  store: &S,
  text: &str,
) -> Result<Option<Vec<Vehicle>>> {
  let text = text.trim();
  if text.is_empty() {
    return Ok(None);
  }
  let found = store
    .search_vehicles(text.to_owned(), SEARCH_LIMIT)
    .await
    .map_err(Error::store)?;
  Ok(Some(found))
}

/// A citizen together with their vehicles and open (non-archived) cases.
pub async fn citizen_record<S: RecordStore>(
  store: &S,
  national_id: &str,
) -> Result<CitizenRecord> {
  let citizen = store
    .get_citizen(national_id.to_owned())
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::CitizenNotFound(national_id.to_owned()))?;

  let vehicles = store
    .vehicles_owned_by(national_id.to_owned())
    .await
    .map_err(Error::store)?;

  let cases = store
    .find_cases(CaseQuery {
      deleted: Some(false),
      defendant_id: Some(national_id.to_owned()),
      ..CaseQuery::default()
    })
    .await
    .map_err(Error::store)?;

  Ok(CitizenRecord { citizen, vehicles, cases })
}
