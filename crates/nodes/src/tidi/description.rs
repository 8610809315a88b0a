//! Serializable node and credential metadata, as the host renders it.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

use super::credentials::CREDENTIAL_NAME;
use super::params::OperationKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyType {
    String,
    Options,
    FixedCollection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeOptions {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub password: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub multiple_values: bool,
}

/// Conditions under which a property is shown, keyed by property name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayOptions {
    pub show: BTreeMap<&'static str, Vec<&'static str>>,
}

/// An entry of an `options` list, or a group of a `fixedCollection`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyOption {
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<NodeProperty>,
}

impl PropertyOption {
    fn choice(name: &'static str, value: &'static str) -> Self {
        Self {
            name,
            display_name: None,
            value: Some(value),
            description: None,
            action: None,
            values: Vec::new(),
        }
    }

    fn operation(
        name: &'static str,
        kind: OperationKind,
        description: &'static str,
    ) -> Self {
        Self {
            description: Some(description),
            action: Some(description),
            ..Self::choice(name, kind.as_str())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProperty {
    pub display_name: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: PropertyType,
    pub default: Value,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub no_data_expression: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_options: Option<TypeOptions>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<PropertyOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_options: Option<DisplayOptions>,
}

impl NodeProperty {
    pub fn string(display_name: &'static str, name: &'static str) -> Self {
        Self {
            display_name,
            name,
            kind: PropertyType::String,
            default: json!(""),
            required: false,
            no_data_expression: false,
            placeholder: None,
            description: None,
            type_options: None,
            options: Vec::new(),
            display_options: None,
        }
    }

    fn options(
        display_name: &'static str,
        name: &'static str,
        options: Vec<PropertyOption>,
        default: &'static str,
    ) -> Self {
        Self {
            kind: PropertyType::Options,
            default: json!(default),
            options,
            ..Self::string(display_name, name)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn password(mut self) -> Self {
        self.type_options.get_or_insert_with(TypeOptions::default).password = true;
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    fn shown_for(mut self, operations: &[OperationKind]) -> Self {
        let names = operations.iter().map(|k| k.as_str()).collect();
        self.display_options = Some(DisplayOptions {
            show: BTreeMap::from([("operation", names)]),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CredentialRef {
    pub name: &'static str,
    pub required: bool,
}

/// Connection kind of a node input or output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionType {
    Main,
}

/// Values a freshly placed node starts with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDefaults {
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    pub display_name: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub group: Vec<&'static str>,
    pub version: u32,
    pub description: &'static str,
    pub defaults: NodeDefaults,
    pub inputs: Vec<ConnectionType>,
    pub outputs: Vec<ConnectionType>,
    pub usable_as_tool: bool,
    pub credentials: Vec<CredentialRef>,
    pub properties: Vec<NodeProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDescription {
    pub name: &'static str,
    pub display_name: &'static str,
    pub documentation_url: &'static str,
    pub properties: Vec<NodeProperty>,
}

/// Description of the `tidiNode` node type.
pub fn node_description() -> NodeDescription {
    use OperationKind::*;

    let operation = NodeProperty {
        no_data_expression: true,
        ..NodeProperty::options(
            "Operação",
            "operation",
            vec![
                PropertyOption::operation(
                    "Obter Informações Do Parceiro",
                    GetPartner,
                    "Obtém informações do parceiro",
                ),
                PropertyOption::operation(
                    "Listar Serviços",
                    GetServices,
                    "Lista todos os serviços do parceiro",
                ),
                PropertyOption::operation(
                    "Listar Profissionais",
                    GetProfessionals,
                    "Lista todos os profissionais do parceiro",
                ),
                PropertyOption::operation(
                    "Verificar Disponibilidade",
                    CheckAvailability,
                    "Verifica disponibilidade na agenda",
                ),
                PropertyOption::operation("Agendar", Schedule, "Cria um agendamento na agenda"),
            ],
            GetPartner.as_str(),
        )
    };

    let language = NodeProperty::options(
        "Idioma",
        "language",
        vec![
            PropertyOption::choice("Português", "pt"),
            PropertyOption::choice("Inglês", "en"),
        ],
        "pt",
    )
    .describe("Idioma para a requisição");

    let booking = [CheckAvailability, Schedule];

    let filters = NodeProperty {
        kind: PropertyType::FixedCollection,
        default: json!({}),
        type_options: Some(TypeOptions {
            multiple_values: true,
            ..TypeOptions::default()
        }),
        options: vec![PropertyOption {
            name: "filters",
            display_name: Some("Filtro"),
            value: None,
            description: None,
            action: None,
            values: vec![
                NodeProperty::string("Nome Do Campo", "key").describe("Nome do campo para filtrar"),
                NodeProperty::string("Valor", "value").describe("Valor do filtro"),
            ],
        }],
        ..NodeProperty::string("Filtros Adicionais", "additionalFilters")
    }
    .shown_for(&[GetServices, GetProfessionals]);

    NodeDescription {
        display_name: "Tidi Node",
        name: "tidiNode",
        icon: "file:/tidi.svg",
        group: vec!["transform"],
        version: 1,
        description: "Nós oficiais da plataforma de agendamentos Tidi.",
        defaults: NodeDefaults { name: "Tidi Node" },
        inputs: vec![ConnectionType::Main],
        outputs: vec![ConnectionType::Main],
        usable_as_tool: true,
        credentials: vec![CredentialRef {
            name: CREDENTIAL_NAME,
            required: true,
        }],
        properties: vec![
            operation,
            language,
            NodeProperty::string("ID Do Profissional", "professionalId")
                .placeholder("ID do profissional")
                .describe("ID do profissional do atendimento")
                .shown_for(&booking),
            NodeProperty::string("Serviços", "services")
                .placeholder(r#"["serviceId1", "serviceId2"]"#)
                .describe("Array JSON com IDs dos serviços")
                .shown_for(&booking),
            NodeProperty::string("Dia", "day")
                .placeholder("2025-08-22")
                .describe("Dia do agendamento (AAAA-MM-DD)")
                .shown_for(&[Schedule]),
            NodeProperty::string("Horário", "hour")
                .placeholder("10:00")
                .describe("Horário do agendamento (HH:MM)")
                .shown_for(&[Schedule]),
            NodeProperty::string("Nome", "name")
                .describe("Nome do cliente")
                .shown_for(&[Schedule]),
            NodeProperty::string("E-mail", "email")
                .describe("E-mail do cliente")
                .shown_for(&[Schedule]),
            NodeProperty::string("Telefone", "phone")
                .describe("Telefone do cliente")
                .shown_for(&[Schedule]),
            filters,
        ],
    }
}
