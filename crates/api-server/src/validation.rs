//! Field-level validation of company write requests
//!
//! Runs at the API boundary: bodies that fail here never reach the store.
//! Failures accumulate into a per-field error map rather than stopping at
//! the first problem. Empty strings on optional fields are normalized to
//! "not provided", matching the form contract.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use cmmc_core::company::{AssessmentType, CmmcLevel, CompanyPatch, NewCompany};
use cmmc_core::patch::Patch;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s\-\+\(\)\.]+$").unwrap());
static ZIP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").unwrap());

const MAX_NAME: usize = 255;
const MAX_DESCRIPTION: usize = 2000;
const MAX_PHONE: usize = 20;
const MAX_CITY: usize = 100;
pub(crate) const MAX_NAICS_CODE: usize = 10;

/// Per-field validation failures, keyed by wire field name.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct FieldErrors {
    pub fields: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// JSON body for `POST /api/companies`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateCompanyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub cmmc_level: Option<i64>,
    pub certification_date: Option<String>,
    pub certification_expiry: Option<String>,
    pub assessment_type: Option<String>,
    pub c3pao_name: Option<String>,
    pub logo_url: Option<String>,
    pub naics_codes: Option<Vec<String>>,
}

/// JSON body for `PUT /api/companies/{id}`: every business field optional,
/// with "absent" distinct from "supplied as null".
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCompanyRequest {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub description: Patch<Option<String>>,
    #[serde(default)]
    pub website: Patch<Option<String>>,
    #[serde(default)]
    pub email: Patch<Option<String>>,
    #[serde(default)]
    pub phone: Patch<Option<String>>,
    #[serde(default)]
    pub address_line1: Patch<Option<String>>,
    #[serde(default)]
    pub address_line2: Patch<Option<String>>,
    #[serde(default)]
    pub city: Patch<Option<String>>,
    #[serde(default)]
    pub state: Patch<Option<String>>,
    #[serde(default)]
    pub zip_code: Patch<Option<String>>,
    #[serde(default)]
    pub cmmc_level: Patch<i64>,
    #[serde(default)]
    pub certification_date: Patch<Option<String>>,
    #[serde(default)]
    pub certification_expiry: Patch<Option<String>>,
    #[serde(default)]
    pub assessment_type: Patch<Option<String>>,
    #[serde(default)]
    pub c3pao_name: Patch<Option<String>>,
    #[serde(default)]
    pub logo_url: Patch<Option<String>>,
    pub naics_codes: Option<Vec<String>>,
}

/// Treat `None` and empty/whitespace strings alike as "not provided".
fn normalize(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub(crate) fn check_len(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.push(field, format!("must be at most {max} characters"));
    }
}

fn check_website(errors: &mut FieldErrors, value: &str) {
    match Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        _ => errors.push("website", "must be a valid http(s) URL"),
    }
}

fn check_email(errors: &mut FieldErrors, value: &str) {
    if !EMAIL_RE.is_match(value) || value.len() > MAX_NAME {
        errors.push("email", "must be a valid email address");
    }
}

fn check_phone(errors: &mut FieldErrors, value: &str) {
    if !PHONE_RE.is_match(value) || value.len() > MAX_PHONE {
        errors.push("phone", "must contain only digits, spaces and + - ( ) .");
    }
}

fn check_state(errors: &mut FieldErrors, value: &str) {
    if value.len() != 2 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
        errors.push("state", "must be a 2-letter state code");
    }
}

fn check_zip(errors: &mut FieldErrors, value: &str) {
    if !ZIP_RE.is_match(value) {
        errors.push("zip_code", "must match 12345 or 12345-6789");
    }
}

fn check_assessment_type(errors: &mut FieldErrors, value: &str) -> Option<AssessmentType> {
    match AssessmentType::parse(value) {
        Ok(assessment) => Some(assessment),
        Err(_) => {
            errors.push("assessment_type", "must be one of: self, c3pao, dibcac");
            None
        }
    }
}

fn check_level(errors: &mut FieldErrors, value: i64) -> Option<CmmcLevel> {
    match CmmcLevel::try_from(value) {
        Ok(level) => Some(level),
        Err(_) => {
            errors.push("cmmc_level", "must be 1, 2 or 3");
            None
        }
    }
}

fn parse_date(errors: &mut FieldErrors, field: &str, value: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(field, "must be a date in YYYY-MM-DD format");
            None
        }
    }
}

fn check_dates(
    errors: &mut FieldErrors,
    certification_date: Option<NaiveDate>,
    certification_expiry: Option<NaiveDate>,
) {
    if let Some(date) = certification_date {
        if date > Utc::now().date_naive() {
            errors.push("certification_date", "cannot be in the future");
        }
    }
    if let (Some(date), Some(expiry)) = (certification_date, certification_expiry) {
        // Strictly after: an expiry equal to the certification date is
        // rejected as well.
        if expiry <= date {
            errors.push(
                "certification_expiry",
                "must be after the certification date",
            );
        }
    }
}

fn check_naics_codes(errors: &mut FieldErrors, codes: &[String]) {
    for code in codes {
        if code.is_empty()
            || code.len() > MAX_NAICS_CODE
            || !code.chars().all(|c| c.is_ascii_digit())
        {
            errors.push("naics_codes", format!("invalid NAICS code: {code:?}"));
        }
    }
}

/// Validate a create request into store inputs.
pub fn validate_create(
    req: CreateCompanyRequest,
) -> Result<(NewCompany, Option<Vec<String>>), FieldErrors> {
    let mut errors = FieldErrors::default();

    let name = match normalize(req.name) {
        Some(name) => {
            check_len(&mut errors, "name", &name, MAX_NAME);
            name
        }
        None => {
            errors.push("name", "is required");
            String::new()
        }
    };

    let description = normalize(req.description);
    if let Some(description) = &description {
        check_len(&mut errors, "description", description, MAX_DESCRIPTION);
    }

    let website = normalize(req.website);
    if let Some(website) = &website {
        check_website(&mut errors, website);
    }
    let email = normalize(req.email);
    if let Some(email) = &email {
        check_email(&mut errors, email);
    }
    let phone = normalize(req.phone);
    if let Some(phone) = &phone {
        check_phone(&mut errors, phone);
    }

    let address_line1 = normalize(req.address_line1);
    match &address_line1 {
        Some(line1) => check_len(&mut errors, "address_line1", line1, MAX_NAME),
        None => errors.push("address_line1", "is required"),
    }
    let address_line2 = normalize(req.address_line2);
    if let Some(line2) = &address_line2 {
        check_len(&mut errors, "address_line2", line2, MAX_NAME);
    }
    let city = normalize(req.city);
    if let Some(city) = &city {
        check_len(&mut errors, "city", city, MAX_CITY);
    }
    let state = normalize(req.state).map(|s| s.to_ascii_uppercase());
    if let Some(state) = &state {
        check_state(&mut errors, state);
    }
    let zip_code = normalize(req.zip_code);
    if let Some(zip) = &zip_code {
        check_zip(&mut errors, zip);
    }

    let cmmc_level = match req.cmmc_level {
        Some(raw) => check_level(&mut errors, raw),
        None => {
            errors.push("cmmc_level", "is required");
            None
        }
    };

    let certification_date = normalize(req.certification_date)
        .and_then(|raw| parse_date(&mut errors, "certification_date", &raw));
    let certification_expiry = normalize(req.certification_expiry)
        .and_then(|raw| parse_date(&mut errors, "certification_expiry", &raw));
    check_dates(&mut errors, certification_date, certification_expiry);

    let assessment_type = normalize(req.assessment_type)
        .and_then(|raw| check_assessment_type(&mut errors, &raw));

    let c3pao_name = normalize(req.c3pao_name);
    if let Some(c3pao) = &c3pao_name {
        check_len(&mut errors, "c3pao_name", c3pao, MAX_NAME);
    }
    let logo_url = normalize(req.logo_url);

    if let Some(codes) = &req.naics_codes {
        check_naics_codes(&mut errors, codes);
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let new = NewCompany {
        name,
        description,
        website,
        email,
        phone,
        address_line1,
        address_line2,
        city,
        state,
        zip_code,
        // Checked above; unreachable when errors is empty.
        cmmc_level: cmmc_level.unwrap_or_default(),
        certification_date,
        certification_expiry,
        assessment_type,
        c3pao_name,
        logo_url,
    };
    Ok((new, req.naics_codes))
}

/// Validate an update request into a patch plus optional association set.
pub fn validate_update(
    req: UpdateCompanyRequest,
) -> Result<(CompanyPatch, Option<Vec<String>>), FieldErrors> {
    let mut errors = FieldErrors::default();
    let mut patch = CompanyPatch::default();

    if let Patch::Set(name) = req.name {
        match normalize(Some(name)) {
            Some(name) => {
                check_len(&mut errors, "name", &name, MAX_NAME);
                patch.name = Patch::Set(name);
            }
            None => errors.push("name", "cannot be empty"),
        }
    }
    if let Patch::Set(description) = req.description {
        let description = normalize(description);
        if let Some(description) = &description {
            check_len(&mut errors, "description", description, MAX_DESCRIPTION);
        }
        patch.description = Patch::Set(description);
    }
    if let Patch::Set(website) = req.website {
        let website = normalize(website);
        if let Some(website) = &website {
            check_website(&mut errors, website);
        }
        patch.website = Patch::Set(website);
    }
    if let Patch::Set(email) = req.email {
        let email = normalize(email);
        if let Some(email) = &email {
            check_email(&mut errors, email);
        }
        patch.email = Patch::Set(email);
    }
    if let Patch::Set(phone) = req.phone {
        let phone = normalize(phone);
        if let Some(phone) = &phone {
            check_phone(&mut errors, phone);
        }
        patch.phone = Patch::Set(phone);
    }
    if let Patch::Set(line1) = req.address_line1 {
        let line1 = normalize(line1);
        if let Some(line1) = &line1 {
            check_len(&mut errors, "address_line1", line1, MAX_NAME);
        }
        patch.address_line1 = Patch::Set(line1);
    }
    if let Patch::Set(line2) = req.address_line2 {
        let line2 = normalize(line2);
        if let Some(line2) = &line2 {
            check_len(&mut errors, "address_line2", line2, MAX_NAME);
        }
        patch.address_line2 = Patch::Set(line2);
    }
    if let Patch::Set(city) = req.city {
        let city = normalize(city);
        if let Some(city) = &city {
            check_len(&mut errors, "city", city, MAX_CITY);
        }
        patch.city = Patch::Set(city);
    }
    if let Patch::Set(state) = req.state {
        let state = normalize(state).map(|s| s.to_ascii_uppercase());
        if let Some(state) = &state {
            check_state(&mut errors, state);
        }
        patch.state = Patch::Set(state);
    }
    if let Patch::Set(zip) = req.zip_code {
        let zip = normalize(zip);
        if let Some(zip) = &zip {
            check_zip(&mut errors, zip);
        }
        patch.zip_code = Patch::Set(zip);
    }
    if let Patch::Set(raw) = req.cmmc_level {
        if let Some(level) = check_level(&mut errors, raw) {
            patch.cmmc_level = Patch::Set(level);
        }
    }

    let mut certification_date = None;
    if let Patch::Set(raw) = req.certification_date {
        certification_date =
            normalize(raw).and_then(|raw| parse_date(&mut errors, "certification_date", &raw));
        patch.certification_date = Patch::Set(certification_date);
    }
    let mut certification_expiry = None;
    if let Patch::Set(raw) = req.certification_expiry {
        certification_expiry =
            normalize(raw).and_then(|raw| parse_date(&mut errors, "certification_expiry", &raw));
        patch.certification_expiry = Patch::Set(certification_expiry);
    }
    check_dates(&mut errors, certification_date, certification_expiry);

    if let Patch::Set(raw) = req.assessment_type {
        let assessment = normalize(raw).and_then(|raw| check_assessment_type(&mut errors, &raw));
        patch.assessment_type = Patch::Set(assessment);
    }
    if let Patch::Set(c3pao) = req.c3pao_name {
        let c3pao = normalize(c3pao);
        if let Some(c3pao) = &c3pao {
            check_len(&mut errors, "c3pao_name", c3pao, MAX_NAME);
        }
        patch.c3pao_name = Patch::Set(c3pao);
    }
    if let Patch::Set(logo) = req.logo_url {
        patch.logo_url = Patch::Set(normalize(logo));
    }

    if let Some(codes) = &req.naics_codes {
        check_naics_codes(&mut errors, codes);
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok((patch, req.naics_codes))
}

/// Cross-check the certification dates a patch would leave in place.
///
/// A partial update may supply only one of the two dates; the ordering
/// rule then has to hold against the stored counterpart, not just within
/// the request body. Fields left at `Keep` take the stored value.
pub fn check_dates_against_stored(
    patch: &CompanyPatch,
    stored_date: Option<NaiveDate>,
    stored_expiry: Option<NaiveDate>,
) -> Result<(), FieldErrors> {
    let date = match &patch.certification_date {
        Patch::Set(date) => *date,
        Patch::Keep => stored_date,
    };
    let expiry = match &patch.certification_expiry {
        Patch::Set(expiry) => *expiry,
        Patch::Keep => stored_expiry,
    };
    if let (Some(date), Some(expiry)) = (date, expiry) {
        if expiry <= date {
            let mut errors = FieldErrors::default();
            errors.push(
                "certification_expiry",
                "must be after the certification date",
            );
            return Err(errors);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> CreateCompanyRequest {
        CreateCompanyRequest {
            name: Some("Acme Defense".to_string()),
            address_line1: Some("1 Main St".to_string()),
            city: Some("Arlington".to_string()),
            state: Some("va".to_string()),
            zip_code: Some("22201".to_string()),
            cmmc_level: Some(2),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_create_passes_and_normalizes() {
        let (new, naics) = validate_create(valid_create()).unwrap();
        assert_eq!(new.name, "Acme Defense");
        assert_eq!(new.state.as_deref(), Some("VA"));
        assert_eq!(new.cmmc_level, CmmcLevel::Two);
        assert!(naics.is_none());
    }

    #[test]
    fn test_missing_required_fields_are_reported_per_field() {
        let errors = validate_create(CreateCompanyRequest::default()).unwrap_err();
        assert!(errors.fields.contains_key("name"));
        assert!(errors.fields.contains_key("address_line1"));
        assert!(errors.fields.contains_key("cmmc_level"));
    }

    #[test]
    fn test_level_out_of_range_is_rejected_not_ignored() {
        let req = CreateCompanyRequest {
            cmmc_level: Some(4),
            ..valid_create()
        };
        let errors = validate_create(req).unwrap_err();
        assert!(errors.fields.contains_key("cmmc_level"));
    }

    #[test]
    fn test_bad_patterns_are_rejected() {
        let req = CreateCompanyRequest {
            website: Some("not a url".to_string()),
            email: Some("not-an-email".to_string()),
            phone: Some("call me maybe".to_string()),
            zip_code: Some("2220".to_string()),
            state: Some("VAX".to_string()),
            assessment_type: Some("psychic".to_string()),
            ..valid_create()
        };
        let errors = validate_create(req).unwrap_err();
        for field in ["website", "email", "phone", "zip_code", "state", "assessment_type"] {
            assert!(errors.fields.contains_key(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_empty_optional_strings_mean_not_provided() {
        let req = CreateCompanyRequest {
            website: Some("".to_string()),
            email: Some("  ".to_string()),
            ..valid_create()
        };
        let (new, _) = validate_create(req).unwrap();
        assert!(new.website.is_none());
        assert!(new.email.is_none());
    }

    #[test]
    fn test_expiry_must_be_strictly_after_certification_date() {
        for (date, expiry, ok) in [
            ("2024-06-01", "2027-06-01", true),
            ("2024-06-01", "2024-06-01", false),
            ("2024-06-01", "2023-06-01", false),
        ] {
            let req = CreateCompanyRequest {
                certification_date: Some(date.to_string()),
                certification_expiry: Some(expiry.to_string()),
                ..valid_create()
            };
            let result = validate_create(req);
            assert_eq!(result.is_ok(), ok, "{date} -> {expiry}");
            if !ok {
                assert!(result
                    .unwrap_err()
                    .fields
                    .contains_key("certification_expiry"));
            }
        }
    }

    #[test]
    fn test_future_certification_date_rejected() {
        let future = (Utc::now().date_naive() + chrono::Days::new(30)).to_string();
        let req = CreateCompanyRequest {
            certification_date: Some(future),
            ..valid_create()
        };
        let errors = validate_create(req).unwrap_err();
        assert!(errors.fields.contains_key("certification_date"));
    }

    #[test]
    fn test_naics_codes_must_be_numeric() {
        let req = CreateCompanyRequest {
            naics_codes: Some(vec!["541512".to_string(), "54-ABC".to_string()]),
            ..valid_create()
        };
        let errors = validate_create(req).unwrap_err();
        assert!(errors.fields.contains_key("naics_codes"));
    }

    #[test]
    fn test_stored_dates_constrain_one_sided_updates() {
        let stored_date = NaiveDate::from_ymd_opt(2024, 6, 1);
        let stored_expiry = NaiveDate::from_ymd_opt(2027, 6, 1);

        // Expiry-only update landing before the stored certification date.
        let (patch, _) = validate_update(
            serde_json::from_str(r#"{"certification_expiry": "2020-01-01"}"#).unwrap(),
        )
        .unwrap();
        let errors =
            check_dates_against_stored(&patch, stored_date, stored_expiry).unwrap_err();
        assert!(errors.fields.contains_key("certification_expiry"));

        // Extending the expiry past the stored date is fine.
        let (patch, _) = validate_update(
            serde_json::from_str(r#"{"certification_expiry": "2030-01-01"}"#).unwrap(),
        )
        .unwrap();
        assert!(check_dates_against_stored(&patch, stored_date, stored_expiry).is_ok());

        // Clearing one side lifts the ordering constraint.
        let (patch, _) = validate_update(
            serde_json::from_str(r#"{"certification_expiry": null}"#).unwrap(),
        )
        .unwrap();
        assert!(check_dates_against_stored(&patch, stored_date, stored_expiry).is_ok());

        // Date-only update jumping past the stored expiry.
        let (patch, _) = validate_update(
            serde_json::from_str(r#"{"certification_date": "2024-01-01"}"#).unwrap(),
        )
        .unwrap();
        let errors = check_dates_against_stored(
            &patch,
            NaiveDate::from_ymd_opt(2020, 1, 1),
            NaiveDate::from_ymd_opt(2021, 1, 1),
        )
        .unwrap_err();
        assert!(errors.fields.contains_key("certification_expiry"));
    }

    #[test]
    fn test_update_distinguishes_absent_from_cleared() {
        let body: UpdateCompanyRequest =
            serde_json::from_str(r#"{"description": null, "name": "Acme"}"#).unwrap();
        let (patch, naics) = validate_update(body).unwrap();
        assert_eq!(patch.name, Patch::Set("Acme".to_string()));
        assert_eq!(patch.description, Patch::Set(None));
        // Fields never mentioned stay untouched.
        assert_eq!(patch.website, Patch::Keep);
        assert!(naics.is_none());
    }

    #[test]
    fn test_update_rejects_bad_fields_without_touching_valid_ones() {
        let body: UpdateCompanyRequest =
            serde_json::from_str(r#"{"cmmc_level": 9, "zip_code": "bad"}"#).unwrap();
        let errors = validate_update(body).unwrap_err();
        assert!(errors.fields.contains_key("cmmc_level"));
        assert!(errors.fields.contains_key("zip_code"));
    }

    #[test]
    fn test_update_empty_naics_list_is_preserved_as_supplied() {
        let body: UpdateCompanyRequest = serde_json::from_str(r#"{"naics_codes": []}"#).unwrap();
        let (_, naics) = validate_update(body).unwrap();
        assert_eq!(naics, Some(vec![]));
    }
}
