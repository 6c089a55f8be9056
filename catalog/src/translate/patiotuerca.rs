//! Translator for PatioTuerca listing pages.
//!
//! A scraped record arrives with up to two sub-sections: `summary` (the
//! headline block of the page) and `ficha_tecnica` (the technical-data
//! table), both optional. Field keys vary between the Spanish page labels
//! and the English keys of the embedded structured data, so each canonical
//! field resolves through an ordered alias list.

use chrono::Utc;
use serde_json::{Map, Value};

use crate::conversions::{numeric, text};
use crate::translate::{Translator, value_text};
use crate::types::{CanonicalRecord, ListingFields, Transmission};

/// Sub-sections of a raw record, in resolution priority order: a summary
/// value wins over a technical-data value, which wins over a root-level one.
const SECTIONS: [&str; 2] = ["summary", "ficha_tecnica"];

const YEAR: [&str; 2] = ["Año", "Year"];
const PRICE: [&str; 3] = ["Precio", "CashPrice", "Precio Contado"];
const BRAND: [&str; 2] = ["Marca", "Brand"];
const MODEL: [&str; 2] = ["Modelo", "Model"];
const MILEAGE: [&str; 3] = ["Recorrido", "Kilometraje", "Mileage"];
const DISPLACEMENT: [&str; 2] = ["Motor(cilindraje)", "Engine"];
const TRANSMISSION: [&str; 2] = ["Transmisión", "Transmission"];
const CITY: [&str; 2] = ["Ciudad", "City"];
const FUEL: [&str; 2] = ["Combustible", "FuelType"];
const STEERING: [&str; 2] = ["Dirección", "Steering"];
const UPHOLSTERY: [&str; 2] = ["Tapizado", "InteriorType"];
const PAYMENT: [&str; 3] = ["Tipo de pago", "TipoPago", "PaymentType"];
const DESCRIPTION: [&str; 2] = ["Subtipo", "Description"];

#[derive(Debug, Clone, Copy, Default)]
pub struct PatioTuercaTranslator;

impl Translator for PatioTuercaTranslator {
    fn translate(&self, raw: &Value) -> CanonicalRecord {
        let resolver = Resolver::new(raw);

        let fields = ListingFields {
            brand: text::clean_opt(resolver.resolve(&BRAND)),
            model: text::clean_opt(resolver.resolve(&MODEL)),
            year: resolver.resolve(&YEAR).as_deref().and_then(numeric::parse_year),
            price: resolver
                .resolve(&PRICE)
                .as_deref()
                .and_then(numeric::parse_price),
            mileage: resolver
                .resolve(&MILEAGE)
                .as_deref()
                .and_then(numeric::parse_mileage),
            city: text::clean_opt(resolver.resolve(&CITY)),
            transmission: resolver
                .resolve(&TRANSMISSION)
                .as_deref()
                .and_then(text::clean_text)
                .map(|value| Transmission::classify(&value)),
            displacement: resolver
                .resolve(&DISPLACEMENT)
                .as_deref()
                .and_then(numeric::parse_displacement),
            fuel: text::clean_opt(resolver.resolve(&FUEL)),
            steering: text::clean_opt(resolver.resolve(&STEERING)),
            upholstery: text::clean_opt(resolver.resolve(&UPHOLSTERY)),
            payment: text::clean_opt(resolver.resolve(&PAYMENT)),
            description: text::clean_opt(resolver.resolve(&DESCRIPTION)),
            url: text::clean_opt(resolver.root_text("url")),
        };

        CanonicalRecord {
            id: text::clean_opt(resolver.root_text("id")),
            fields,
            captured_at: Utc::now(),
            raw: raw.clone(),
        }
    }
}

/// Alias resolution over the sections of one raw record.
struct Resolver<'a> {
    sections: Vec<&'a Map<String, Value>>,
}

impl<'a> Resolver<'a> {
    fn new(raw: &'a Value) -> Resolver<'a> {
        let mut sections = Vec::with_capacity(SECTIONS.len() + 1);
        for name in SECTIONS {
            if let Some(section) = raw.get(name).and_then(Value::as_object) {
                sections.push(section);
            }
        }
        // Root-level keys are the last resort; listing dumps occasionally
        // flatten a section away.
        if let Some(root) = raw.as_object() {
            sections.push(root);
        }
        Resolver { sections }
    }

    /// Returns the first non-blank value for any alias, walking sections in
    /// priority order and aliases in order within each section.
    fn resolve(&self, aliases: &[&str]) -> Option<String> {
        for section in &self.sections {
            for alias in aliases {
                if let Some(found) = section.get(*alias).and_then(value_text) {
                    if !found.trim().is_empty() {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    /// Reads a root-level value, ignoring sections.
    fn root_text(&self, key: &str) -> Option<String> {
        value_text(self.sections.last()?.get(key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_value_wins_over_technical_data() {
        let raw = json!({
            "id": "1925036",
            "summary": { "Precio": "$18.500" },
            "ficha_tecnica": { "Precio": "$17.000", "Marca": "Nissan" },
        });
        let record = PatioTuercaTranslator.translate(&raw);
        assert_eq!(record.fields.price, Some(18_500.0));
        assert_eq!(record.fields.brand, Some("Nissan".to_string()));
    }

    #[test]
    fn aliases_resolve_in_order_within_a_section() {
        let raw = json!({
            "ficha_tecnica": { "CashPrice": "12000", "Precio Contado": "99000" },
        });
        let record = PatioTuercaTranslator.translate(&raw);
        assert_eq!(record.fields.price, Some(12_000.0));
    }

    #[test]
    fn missing_sections_are_tolerated() {
        let raw = json!({ "id": "5", "Marca": "Kia", "Año": 2021 });
        let record = PatioTuercaTranslator.translate(&raw);
        assert_eq!(record.id, Some("5".to_string()));
        assert_eq!(record.fields.brand, Some("Kia".to_string()));
        assert_eq!(record.fields.year, Some(2021));
    }

    #[test]
    fn unparseable_values_become_gaps_instead_of_errors() {
        let raw = json!({
            "id": "9",
            "summary": { "Año": "n/a", "Precio": "consultar" },
        });
        let record = PatioTuercaTranslator.translate(&raw);
        assert_eq!(record.fields.year, None);
        assert_eq!(record.fields.price, None);
        assert!(record.gaps().contains(&"year"));
        assert!(record.gaps().contains(&"price"));
    }

    #[test]
    fn blank_resolved_value_falls_through_to_the_next_section() {
        let raw = json!({
            "summary": { "Ciudad": "   " },
            "ficha_tecnica": { "Ciudad": "Quito" },
        });
        let record = PatioTuercaTranslator.translate(&raw);
        assert_eq!(record.fields.city, Some("Quito".to_string()));
    }

    #[test]
    fn numeric_id_is_read_as_text() {
        let raw = json!({ "id": 1925036 });
        let record = PatioTuercaTranslator.translate(&raw);
        assert_eq!(record.id, Some("1925036".to_string()));
    }

    #[test]
    fn raw_payload_is_retained() {
        let raw = json!({ "id": "3", "summary": { "Marca": "Chevrolet" } });
        let record = PatioTuercaTranslator.translate(&raw);
        assert_eq!(record.raw, raw);
    }

    #[test]
    fn transmission_is_classified() {
        let raw = json!({ "ficha_tecnica": { "Transmisión": "Transmisión Automática" } });
        let record = PatioTuercaTranslator.translate(&raw);
        assert_eq!(record.fields.transmission, Some(Transmission::Automatic));

        let raw = json!({ "ficha_tecnica": { "Transmisión": "CVT" } });
        let record = PatioTuercaTranslator.translate(&raw);
        assert_eq!(record.fields.transmission, Some(Transmission::Unknown));
    }
}
