//! Translator for Autocor dealer-API records.
//!
//! Autocor serves flat JSON objects with English keys. Transmission and
//! displacement are not first-class fields there; both are inferred from the
//! `version` trim description (`"SPORTAGE 2.0 TA"`) with the saving-plan
//! order line as a stronger transmission signal when present.

use chrono::Utc;
use serde_json::Value;

use crate::conversions::{numeric, text};
use crate::translate::{Translator, value_text};
use crate::types::{CanonicalRecord, ListingFields, Transmission};

#[derive(Debug, Clone, Copy, Default)]
pub struct AutocorTranslator;

impl Translator for AutocorTranslator {
    fn translate(&self, raw: &Value) -> CanonicalRecord {
        let get = |key: &str| raw.get(key).and_then(value_text);

        let version = get("version").unwrap_or_default();
        let saving_plan_order = get("saving_plan_order").unwrap_or_default();

        let fields = ListingFields {
            brand: text::clean_opt(get("brand")),
            model: text::clean_opt(get("model")),
            year: get("year").as_deref().and_then(numeric::parse_year),
            price: get("prices").as_deref().and_then(numeric::parse_price),
            mileage: get("odometer").as_deref().and_then(numeric::parse_mileage),
            city: text::clean_opt(get("location")),
            transmission: infer_transmission(&version, &saving_plan_order),
            displacement: numeric::liters(&version),
            fuel: text::clean_opt(get("fuel_name")),
            steering: None,
            upholstery: None,
            payment: None,
            description: text::clean_opt(get("type")),
            url: text::clean_opt(get("url")),
        };

        CanonicalRecord {
            id: text::clean_opt(get("id_record")),
            fields,
            captured_at: Utc::now(),
            raw: raw.clone(),
        }
    }
}

/// Infers the transmission from the saving-plan order line, falling back to
/// `TA`/`TM` tokens inside the version description.
fn infer_transmission(version: &str, saving_plan_order: &str) -> Option<Transmission> {
    let order = saving_plan_order.trim().to_uppercase();
    if order.contains("AUTOM") {
        return Some(Transmission::Automatic);
    }
    if order.contains("MANU") {
        return Some(Transmission::Manual);
    }

    for token in version.split_whitespace() {
        if token.eq_ignore_ascii_case("TA") {
            return Some(Transmission::Automatic);
        }
        if token.eq_ignore_ascii_case("TM") {
            return Some(Transmission::Manual);
        }
    }
    None
}
