//! Field normalization for rendez-vous payloads.
//!
//! Upstream data sources use two naming conventions for the same record: a
//! legacy shape (`nom`, `status`, `formatRdv`, ...) and the canonical shape
//! (`nomBeneficiaire`, `statut`, `canal`, ...). This module reconciles both
//! into one in-memory representation and produces the legacy wire shape on
//! the way out. It also owns the envelope parser that absorbs the different
//! wrapping structures payloads arrive in.
//!
//! Precedence rule: when a field is present under both names, the legacy
//! name wins. Missing fields stay `None`; the mapper never fails.

use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::error::INVALID_ENVELOPE_MESSAGE;

/// Canonical in-memory representation of rendez-vous fields, as assembled
/// from an inbound payload. All fields are optional: only what the source
/// actually provided is carried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RendezvousDraft {
    pub type_rdv: Option<String>,
    pub statut: Option<String>,
    pub nom_beneficiaire: Option<String>,
    pub prenom_beneficiaire: Option<String>,
    pub email_beneficiaire: Option<String>,
    pub telephone_beneficiaire: Option<String>,
    pub entreprise: Option<String>,
    pub siret: Option<String>,
    pub besoins_accessibilite: Option<String>,
    pub canal: Option<String>,
    pub date_rdv: Option<String>,
    pub duree_minutes: Option<i32>,
    pub lieu: Option<String>,
    pub lien_visio: Option<String>,
    pub objectifs: Option<Vec<String>>,
    pub competences_actuelles: Option<String>,
    pub competences_visees: Option<String>,
    pub niveau_beneficiaire: Option<String>,
    pub formation_selectionnee: Option<String>,
    pub date_dispo: Option<String>,
    pub modalite_formation: Option<String>,
    pub synthese: Option<String>,
    pub commentaires: Option<String>,
    pub notes: Option<String>,
}

/// Field pairs reconciled by the normalizer: (legacy name, canonical name).
const ALIASED_FIELDS: &[(&str, &str)] = &[
    ("nom", "nomBeneficiaire"),
    ("prenom", "prenomBeneficiaire"),
    ("email", "emailBeneficiaire"),
    ("telephone", "telephoneBeneficiaire"),
    ("status", "statut"),
    ("formatRdv", "canal"),
    ("formationTitre", "formationSelectionnee"),
    ("niveau", "niveauBeneficiaire"),
    ("disponibilites", "dateDispo"),
    ("formatSouhaite", "modaliteFormation"),
];

fn string_at(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Read a field preferring the legacy name over the canonical one.
fn aliased_string(obj: &Map<String, Value>, legacy: &str, canonical: &str) -> Option<String> {
    string_at(obj, legacy).or_else(|| string_at(obj, canonical))
}

/// Coerce the `objectifs` field, which arrives as an array of strings, a
/// single string, or null/absent. The source is inconsistent; none of the
/// shapes is an error.
fn coerce_objectifs(value: Option<&Value>) -> Option<Vec<String>> {
    match value {
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .filter_map(|item| item.as_str().map(|s| s.to_string()))
                .collect(),
        ),
        Some(Value::String(single)) => Some(vec![single.clone()]),
        _ => None,
    }
}

/// Map an inbound payload (legacy or canonical shape, or a mix) into the
/// canonical representation.
pub fn map_api_data_to_rendezvous(input: &Value) -> RendezvousDraft {
    let Some(obj) = input.as_object() else {
        return RendezvousDraft::default();
    };

    let mut draft = RendezvousDraft {
        type_rdv: string_at(obj, "type"),
        entreprise: string_at(obj, "entreprise"),
        siret: string_at(obj, "siret"),
        besoins_accessibilite: string_at(obj, "besoinsAccessibilite"),
        date_rdv: string_at(obj, "dateRdv"),
        duree_minutes: obj
            .get("dureeMinutes")
            .and_then(|v| v.as_i64())
            .and_then(|v| i32::try_from(v).ok()),
        lieu: string_at(obj, "lieu"),
        lien_visio: string_at(obj, "lienVisio"),
        objectifs: coerce_objectifs(obj.get("objectifs")),
        competences_actuelles: string_at(obj, "competencesActuelles"),
        competences_visees: string_at(obj, "competencesVisees"),
        synthese: string_at(obj, "synthese"),
        commentaires: string_at(obj, "commentaires"),
        notes: string_at(obj, "notes"),
        ..Default::default()
    };

    for (legacy, canonical) in ALIASED_FIELDS {
        let value = aliased_string(obj, legacy, canonical);
        match *canonical {
            "nomBeneficiaire" => draft.nom_beneficiaire = value,
            "prenomBeneficiaire" => draft.prenom_beneficiaire = value,
            "emailBeneficiaire" => draft.email_beneficiaire = value,
            "telephoneBeneficiaire" => draft.telephone_beneficiaire = value,
            "statut" => draft.statut = value,
            "canal" => draft.canal = value,
            "formationSelectionnee" => draft.formation_selectionnee = value,
            "niveauBeneficiaire" => draft.niveau_beneficiaire = value,
            "dateDispo" => draft.date_dispo = value,
            "modaliteFormation" => draft.modalite_formation = value,
            _ => {}
        }
    }

    draft
}

/// Produce the legacy wire shape from the canonical representation.
///
/// `objectifs` is always serialized as a single comma-joined string, and
/// `type` defaults to `positionnement` when absent. The objectifs round trip
/// is lossy by design (list → string → single-element list).
pub fn prepare_rendezvous_for_api(draft: &RendezvousDraft) -> Value {
    let mut out = Map::new();

    out.insert(
        "type".to_string(),
        json!(
            draft
                .type_rdv
                .clone()
                .unwrap_or_else(|| "positionnement".to_string())
        ),
    );

    let mut put = |key: &str, value: &Option<String>| {
        if let Some(value) = value {
            out.insert(key.to_string(), json!(value));
        }
    };

    put("nom", &draft.nom_beneficiaire);
    put("prenom", &draft.prenom_beneficiaire);
    put("email", &draft.email_beneficiaire);
    put("telephone", &draft.telephone_beneficiaire);
    put("status", &draft.statut);
    put("formatRdv", &draft.canal);
    put("formationTitre", &draft.formation_selectionnee);
    put("niveau", &draft.niveau_beneficiaire);
    put("disponibilites", &draft.date_dispo);
    put("formatSouhaite", &draft.modalite_formation);
    put("dateRdv", &draft.date_rdv);
    put("entreprise", &draft.entreprise);
    put("siret", &draft.siret);
    put("synthese", &draft.synthese);
    put("commentaires", &draft.commentaires);
    put("notes", &draft.notes);

    if let Some(objectifs) = &draft.objectifs {
        out.insert("objectifs".to_string(), json!(objectifs.join(", ")));
    }

    Value::Object(out)
}

/// Errors produced while interpreting payload envelopes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("{INVALID_ENVELOPE_MESSAGE}")]
    InvalidEnvelope,
}

/// Normalized payload envelope: a payload arrives either as a collection or
/// as a single record, possibly wrapped in a `data` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    Items(Vec<Value>),
    Item(Value),
}

/// Parse the wrapping structure of a payload: `{"data": [...]}`,
/// `{"data": {...}}`, a bare array, or a bare object. Anything else is
/// rejected with the fixed contractual message. This runs once at the
/// ingestion boundary so the state machine and normalizer never branch on
/// shape.
pub fn parse_envelope(payload: &Value) -> Result<Envelope, NormalizationError> {
    match payload {
        Value::Array(items) => Ok(Envelope::Items(items.clone())),
        Value::Object(obj) => match obj.get("data") {
            Some(Value::Array(items)) => Ok(Envelope::Items(items.clone())),
            Some(Value::Object(_)) => Ok(Envelope::Item(obj["data"].clone())),
            Some(_) => Err(NormalizationError::InvalidEnvelope),
            None => Ok(Envelope::Item(payload.clone())),
        },
        _ => Err(NormalizationError::InvalidEnvelope),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_name_wins_over_canonical() {
        let input = json!({"nom": "GenericNom", "nomBeneficiaire": "SpecificNom"});
        let draft = map_api_data_to_rendezvous(&input);
        assert_eq!(draft.nom_beneficiaire.as_deref(), Some("GenericNom"));
    }

    #[test]
    fn canonical_name_used_when_legacy_absent() {
        let input = json!({"nomBeneficiaire": "SpecificNom", "statut": "nouveau"});
        let draft = map_api_data_to_rendezvous(&input);
        assert_eq!(draft.nom_beneficiaire.as_deref(), Some("SpecificNom"));
        assert_eq!(draft.statut.as_deref(), Some("nouveau"));
    }

    #[test]
    fn legacy_status_and_format_map_to_canonical() {
        let input = json!({"status": "planifie", "formatRdv": "visio", "niveau": "debutant"});
        let draft = map_api_data_to_rendezvous(&input);
        assert_eq!(draft.statut.as_deref(), Some("planifie"));
        assert_eq!(draft.canal.as_deref(), Some("visio"));
        assert_eq!(draft.niveau_beneficiaire.as_deref(), Some("debutant"));
    }

    #[test]
    fn absent_fields_stay_none() {
        let draft = map_api_data_to_rendezvous(&json!({}));
        assert_eq!(draft, RendezvousDraft::default());
    }

    #[test]
    fn objectifs_null_maps_to_none() {
        let draft = map_api_data_to_rendezvous(&json!({"objectifs": null}));
        assert_eq!(draft.objectifs, None);
    }

    #[test]
    fn objectifs_string_wraps_into_list() {
        let draft = map_api_data_to_rendezvous(&json!({"objectifs": "x"}));
        assert_eq!(draft.objectifs, Some(vec!["x".to_string()]));
    }

    #[test]
    fn objectifs_list_passes_through() {
        let draft = map_api_data_to_rendezvous(&json!({"objectifs": ["a", "b"]}));
        assert_eq!(
            draft.objectifs,
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn outbound_joins_objectifs() {
        let draft = RendezvousDraft {
            objectifs: Some(vec!["a".to_string(), "b".to_string()]),
            ..Default::default()
        };
        let out = prepare_rendezvous_for_api(&draft);
        assert_eq!(out["objectifs"], json!("a, b"));
    }

    #[test]
    fn outbound_defaults_type_and_renames_fields() {
        let draft = RendezvousDraft {
            nom_beneficiaire: Some("Durand".to_string()),
            email_beneficiaire: Some("d@example.fr".to_string()),
            niveau_beneficiaire: Some("avance".to_string()),
            ..Default::default()
        };
        let out = prepare_rendezvous_for_api(&draft);
        assert_eq!(out["type"], json!("positionnement"));
        assert_eq!(out["nom"], json!("Durand"));
        assert_eq!(out["email"], json!("d@example.fr"));
        assert_eq!(out["niveau"], json!("avance"));
        assert!(out.get("nomBeneficiaire").is_none());
    }

    #[test]
    fn objectifs_round_trip_is_lossy() {
        let draft = RendezvousDraft {
            objectifs: Some(vec!["a".to_string(), "b".to_string()]),
            ..Default::default()
        };
        let wire = prepare_rendezvous_for_api(&draft);
        let back = map_api_data_to_rendezvous(&wire);
        assert_eq!(back.objectifs, Some(vec!["a, b".to_string()]));
    }

    #[test]
    fn envelope_accepts_all_four_shapes() {
        assert_eq!(
            parse_envelope(&json!([{"a": 1}])),
            Ok(Envelope::Items(vec![json!({"a": 1})]))
        );
        assert_eq!(
            parse_envelope(&json!({"data": [{"a": 1}]})),
            Ok(Envelope::Items(vec![json!({"a": 1})]))
        );
        assert_eq!(
            parse_envelope(&json!({"data": {"a": 1}})),
            Ok(Envelope::Item(json!({"a": 1})))
        );
        assert_eq!(
            parse_envelope(&json!({"a": 1})),
            Ok(Envelope::Item(json!({"a": 1})))
        );
    }

    #[test]
    fn envelope_rejects_scalar_data() {
        let err = parse_envelope(&json!({"data": "unexpected format"})).unwrap_err();
        assert_eq!(err.to_string(), "Format de réponse invalide");
    }

    #[test]
    fn envelope_rejects_bare_scalar() {
        assert!(parse_envelope(&json!("nope")).is_err());
        assert!(parse_envelope(&json!(42)).is_err());
    }
}
