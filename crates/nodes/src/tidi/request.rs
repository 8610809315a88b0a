//! Request translation: `OperationRequest` → `HttpRequestDescriptor`.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde_json::json;
use url::form_urlencoded;

use super::params::{Filter, Language, Operation, OperationKind, OperationRequest};
use crate::http::{BodyEncoding, HttpMethod, HttpRequestDescriptor, RequestBody, API_KEY_HEADER};

/// Public origin of the Tidi API.
pub const DEFAULT_BASE_URL: &str = "https://api.tidi.com.br";

/// Path of `kind` for `language`, e.g. `/pt/integration/partner`.
pub fn endpoint(kind: OperationKind, language: Language) -> String {
    let suffix = match kind {
        OperationKind::GetPartner => "",
        OperationKind::GetServices => "/services",
        OperationKind::GetProfessionals => "/professionals",
        OperationKind::CheckAvailability => "/schedule/availability",
        OperationKind::Schedule => "/schedule",
    };
    format!("/{language}/integration/partner{suffix}")
}

pub fn method(kind: OperationKind) -> HttpMethod {
    match kind {
        OperationKind::GetPartner | OperationKind::GetServices | OperationKind::GetProfessionals => {
            HttpMethod::Get
        }
        OperationKind::CheckAvailability | OperationKind::Schedule => HttpMethod::Post,
    }
}

pub fn encoding(kind: OperationKind) -> BodyEncoding {
    match kind {
        OperationKind::Schedule => BodyEncoding::FormUrlEncoded,
        _ => BodyEncoding::Json,
    }
}

/// Query parameters from filter pairs. Pairs with an empty key or value are
/// dropped; a repeated key keeps its first position and its last value.
pub fn query_from_filters(filters: &[Filter]) -> IndexMap<String, String> {
    filters
        .iter()
        .filter(|f| !f.key.is_empty() && !f.value.is_empty())
        .map(|f| (f.key.clone(), f.value.clone()))
        .collect()
}

/// `application/x-www-form-urlencoded` serialization, fields in the given
/// order. Empty values are kept (`key=`); spaces become `+`.
pub fn encode_form<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish()
}

/// Build the HTTP request for `request` against `base_url`.
pub fn build(request: &OperationRequest, base_url: &str) -> HttpRequestDescriptor {
    let kind = request.operation.kind();
    let path = endpoint(kind, request.language);

    let (query, body) = match &request.operation {
        Operation::GetPartner => (IndexMap::new(), None),
        Operation::GetServices { filters } | Operation::GetProfessionals { filters } => {
            (query_from_filters(filters), None)
        }
        Operation::CheckAvailability {
            professional,
            services,
        } => (
            IndexMap::new(),
            Some(RequestBody::Json(json!({
                "professional": professional,
                "services": services,
            }))),
        ),
        Operation::Schedule(appointment) => (
            IndexMap::new(),
            Some(RequestBody::Form(encode_form(appointment.form_fields()))),
        ),
    };

    let headers = BTreeMap::from([
        (
            API_KEY_HEADER.to_owned(),
            request.api_key.expose().to_owned(),
        ),
        (
            "Content-Type".to_owned(),
            encoding(kind).content_type().to_owned(),
        ),
    ]);

    HttpRequestDescriptor {
        method: method(kind),
        url: format!("{}{}", base_url.trim_end_matches('/'), path),
        headers,
        query,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tidi::params::{ApiKey, Appointment, TidiParameters};
    use crate::NodeError;
    use serde_json::Value;

    fn request(operation: Operation, language: Language) -> OperationRequest {
        OperationRequest {
            operation,
            language,
            api_key: ApiKey::new("key-123"),
        }
    }

    fn sample(kind: OperationKind) -> Operation {
        match kind {
            OperationKind::GetPartner => Operation::GetPartner,
            OperationKind::GetServices => Operation::GetServices { filters: vec![] },
            OperationKind::GetProfessionals => Operation::GetProfessionals { filters: vec![] },
            OperationKind::CheckAvailability => Operation::CheckAvailability {
                professional: "p1".into(),
                services: "[\"s1\"]".into(),
            },
            OperationKind::Schedule => Operation::Schedule(Appointment::default()),
        }
    }

    #[test]
    fn paths_and_methods_match_the_endpoint_table() {
        let table = [
            (OperationKind::GetPartner, "/integration/partner", HttpMethod::Get),
            (OperationKind::GetServices, "/integration/partner/services", HttpMethod::Get),
            (
                OperationKind::GetProfessionals,
                "/integration/partner/professionals",
                HttpMethod::Get,
            ),
            (
                OperationKind::CheckAvailability,
                "/integration/partner/schedule/availability",
                HttpMethod::Post,
            ),
            (OperationKind::Schedule, "/integration/partner/schedule", HttpMethod::Post),
        ];

        for language in Language::ALL {
            for (kind, path, expected_method) in table {
                let d = build(&request(sample(kind), language), DEFAULT_BASE_URL);
                assert_eq!(
                    d.url,
                    format!("https://api.tidi.com.br/{}{}", language.as_str(), path),
                    "{kind} / {language}"
                );
                assert_eq!(d.method, expected_method, "{kind}");
            }
        }
    }

    #[test]
    fn every_request_carries_the_api_key() {
        for kind in OperationKind::ALL {
            let d = build(&request(sample(kind), Language::Pt), DEFAULT_BASE_URL);
            assert_eq!(d.header("x-api-key"), Some("key-123"));
        }
    }

    #[test]
    fn filters_become_query_params_last_wins() {
        let filters = vec![
            Filter::new("a", "1"),
            Filter::new("", "2"),
            Filter::new("b", ""),
            Filter::new("b", "3"),
        ];
        for op in [
            Operation::GetServices {
                filters: filters.clone(),
            },
            Operation::GetProfessionals {
                filters: filters.clone(),
            },
        ] {
            let d = build(&request(op, Language::Pt), DEFAULT_BASE_URL);
            let pairs: Vec<(&str, &str)> =
                d.query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
            assert_eq!(pairs, vec![("a", "1"), ("b", "3")]);
            assert!(d.body.is_none());
        }
    }

    #[test]
    fn query_keeps_filter_order() {
        let filters = vec![
            Filter::new("zone", "south"),
            Filter::new("active", "1"),
            Filter::new("category", "hair"),
            Filter::new("zone", "north"),
        ];
        let query = query_from_filters(&filters);
        let pairs: Vec<(&str, &str)> =
            query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(pairs, vec![("zone", "north"), ("active", "1"), ("category", "hair")]);
    }

    #[test]
    fn get_partner_has_no_query_or_body() {
        let d = build(&request(Operation::GetPartner, Language::En), DEFAULT_BASE_URL);
        assert!(d.query.is_empty());
        assert!(d.body.is_none());
        assert_eq!(d.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn schedule_body_is_form_encoded_in_declaration_order() {
        let appointment = Appointment {
            day: "2025-08-22".into(),
            hour: "10:00".into(),
            professional: "p1".into(),
            services: "[\"s1\"]".into(),
            name: "Ana".into(),
            email: "a@x.com".into(),
            phone: "31999999999".into(),
        };
        let d = build(
            &request(Operation::Schedule(appointment), Language::Pt),
            DEFAULT_BASE_URL,
        );

        assert_eq!(
            d.body,
            Some(RequestBody::Form(
                "day=2025-08-22&hour=10%3A00&professional=p1&services=%5B%22s1%22%5D\
                 &name=Ana&email=a%40x.com&phone=31999999999"
                    .into()
            ))
        );
        assert_eq!(d.header("Content-Type"), Some("application/x-www-form-urlencoded"));
        assert_eq!(d.body_encoding(), Some(BodyEncoding::FormUrlEncoded));
    }

    #[test]
    fn empty_form_fields_are_kept() {
        let d = build(
            &request(Operation::Schedule(Appointment::default()), Language::Pt),
            DEFAULT_BASE_URL,
        );
        assert_eq!(
            d.body,
            Some(RequestBody::Form(
                "day=&hour=&professional=&services=&name=&email=&phone=".into()
            ))
        );
    }

    #[test]
    fn form_encoding_turns_spaces_into_plus() {
        assert_eq!(encode_form([("name", "Ana Maria")]), "name=Ana+Maria");
    }

    #[test]
    fn check_availability_sends_json_body() {
        let d = build(
            &request(sample(OperationKind::CheckAvailability), Language::Pt),
            DEFAULT_BASE_URL,
        );
        assert_eq!(d.method, HttpMethod::Post);
        assert_eq!(d.header("Content-Type"), Some("application/json"));
        assert_eq!(
            d.body,
            Some(RequestBody::Json(
                serde_json::json!({ "professional": "p1", "services": "[\"s1\"]" })
            ))
        );
    }

    #[test]
    fn base_url_trailing_slash_is_ignored() {
        let d = build(&request(Operation::GetPartner, Language::Pt), "http://127.0.0.1:9000/");
        assert_eq!(d.url, "http://127.0.0.1:9000/pt/integration/partner");
    }

    #[test]
    fn unknown_operation_fails_regardless_of_other_fields() {
        let params: TidiParameters = serde_json::from_value(serde_json::json!({
            "operation": "cancelAppointment",
            "language": "pt",
            "professionalId": "p1",
            "services": "[]",
        }))
        .unwrap();
        let err = params.into_request(ApiKey::new("k")).unwrap_err();
        assert!(matches!(err, NodeError::Configuration(ref m) if m.contains("cancelAppointment")));
    }

    #[test]
    fn descriptor_body_value_is_structured_for_json() {
        let d = build(
            &request(sample(OperationKind::CheckAvailability), Language::En),
            DEFAULT_BASE_URL,
        );
        match d.body {
            Some(RequestBody::Json(Value::Object(map))) => {
                assert_eq!(map.len(), 2);
            }
            other => panic!("unexpected body {other:?}"),
        }
    }
}
