//! Integration tests for the rendez-vous lifecycle service.

use chrono::{Months, Utc};
use formapilot::config::LifecyclePolicyConfig;
use formapilot::error::RepositoryError;
use formapilot::lifecycle::{ImpactEvaluation, LifecycleError, LifecycleService};
use formapilot::repositories::{ProgrammeRepository, RendezvousRepository, RendezvousUpdate};

#[path = "test_utils/mod.rs"]
mod test_utils;

#[tokio::test]
async fn valider_plans_the_rendezvous_and_stamps_canal() {
    let db = test_utils::setup_test_db().await.unwrap();
    let model = test_utils::create_positionnement(&db).await.unwrap();
    let service = LifecycleService::new(&db, LifecyclePolicyConfig::default());

    let updated = service
        .valider(model.id, Some("visio".to_string()), None, None)
        .await
        .unwrap();

    assert_eq!(updated.statut, "rdv_planifie");
    assert_eq!(updated.canal.as_deref(), Some("visio"));
    assert_eq!(updated.version, 2);
}

#[tokio::test]
async fn valider_twice_is_tolerated() {
    let db = test_utils::setup_test_db().await.unwrap();
    let model = test_utils::create_positionnement(&db).await.unwrap();
    let service = LifecycleService::new(&db, LifecyclePolicyConfig::default());

    service.valider(model.id, None, None, None).await.unwrap();
    let again = service
        .valider(model.id, Some("presentiel".to_string()), None, None)
        .await
        .unwrap();

    assert_eq!(again.statut, "rdv_planifie");
    assert_eq!(again.canal.as_deref(), Some("presentiel"));
}

#[tokio::test]
async fn valider_rejects_cancelled_rendezvous() {
    let db = test_utils::setup_test_db().await.unwrap();
    let model = test_utils::create_positionnement(&db).await.unwrap();
    let service = LifecycleService::new(&db, LifecyclePolicyConfig::default());

    service
        .annuler(model.id, Some("désistement".to_string()), None)
        .await
        .unwrap();

    let err = service.valider(model.id, None, None, None).await.unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
}

#[tokio::test]
async fn annuler_stores_the_raison() {
    let db = test_utils::setup_test_db().await.unwrap();
    let model = test_utils::create_positionnement(&db).await.unwrap();
    let service = LifecycleService::new(&db, LifecyclePolicyConfig::default());

    let cancelled = service
        .annuler(model.id, Some("indisponibilité".to_string()), None)
        .await
        .unwrap();

    assert_eq!(cancelled.statut, "annule");
    assert_eq!(cancelled.raison_annulation.as_deref(), Some("indisponibilité"));
}

#[tokio::test]
async fn reprogrammer_rejects_cancelled_rendezvous() {
    let db = test_utils::setup_test_db().await.unwrap();
    let model = test_utils::create_positionnement(&db).await.unwrap();
    let service = LifecycleService::new(&db, LifecyclePolicyConfig::default());

    service.annuler(model.id, None, None).await.unwrap();

    let err = service
        .reprogrammer(model.id, Utc::now().into(), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::TerminalLocked { .. }));
}

#[tokio::test]
async fn changer_statut_follows_the_transition_table() {
    let db = test_utils::setup_test_db().await.unwrap();
    let model = test_utils::create_positionnement(&db).await.unwrap();
    let service = LifecycleService::new(&db, LifecyclePolicyConfig::default());

    // nouveau -> termine is not allowed
    let err = service
        .changer_statut(model.id, "termine", None)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidTransition { .. }));

    // but the legal chain goes through
    service
        .changer_statut(model.id, "rdv_planifie", None)
        .await
        .unwrap();
    service.changer_statut(model.id, "confirme", None).await.unwrap();
    let done = service.changer_statut(model.id, "termine", None).await.unwrap();
    assert_eq!(done.statut, "termine");
}

#[tokio::test]
async fn changer_statut_rejects_unknown_statut() {
    let db = test_utils::setup_test_db().await.unwrap();
    let model = test_utils::create_positionnement(&db).await.unwrap();
    let service = LifecycleService::new(&db, LifecyclePolicyConfig::default());

    let err = service
        .changer_statut(model.id, "inconnu", None)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::UnknownStatut(_)));
}

#[tokio::test]
async fn planifier_impact_copies_beneficiary_and_defaults_the_date() {
    let db = test_utils::setup_test_db().await.unwrap();
    let model = test_utils::create_positionnement(&db).await.unwrap();
    let service = LifecycleService::new(&db, LifecyclePolicyConfig::default());

    let impact = service.planifier_impact(model.id, None).await.unwrap();

    assert_eq!(impact.type_rdv, "impact");
    assert_eq!(impact.statut, "impact");
    assert_eq!(impact.rendezvous_parent_id, Some(model.id));
    assert_eq!(impact.nom_beneficiaire.as_deref(), Some("Durand"));
    assert_eq!(impact.email_beneficiaire.as_deref(), Some("claire.durand@example.fr"));

    // default follow-up lands roughly six months out
    let date_impact = impact.date_impact.expect("date_impact should be set");
    let lower = Utc::now().checked_add_months(Months::new(5)).unwrap();
    assert!(date_impact > lower);
}

#[tokio::test]
async fn planifier_impact_rejects_non_positionnement_parents() {
    let db = test_utils::setup_test_db().await.unwrap();
    let model = test_utils::create_positionnement(&db).await.unwrap();
    let service = LifecycleService::new(&db, LifecyclePolicyConfig::default());

    let impact = service.planifier_impact(model.id, None).await.unwrap();
    let err = service.planifier_impact(impact.id, None).await.unwrap_err();
    assert!(matches!(err, LifecycleError::WrongType { .. }));
}

#[tokio::test]
async fn impact_evaluation_validates_the_satisfaction_scale() {
    let db = test_utils::setup_test_db().await.unwrap();
    let model = test_utils::create_positionnement(&db).await.unwrap();
    let service = LifecycleService::new(&db, LifecyclePolicyConfig::default());
    let impact = service.planifier_impact(model.id, None).await.unwrap();

    let err = service
        .completer_evaluation_impact(
            impact.id,
            ImpactEvaluation {
                satisfaction_impact: Some(11),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Validation(_)));
}

#[tokio::test]
async fn impact_chain_runs_to_completion() {
    let db = test_utils::setup_test_db().await.unwrap();
    let model = test_utils::create_positionnement(&db).await.unwrap();
    let service = LifecycleService::new(&db, LifecyclePolicyConfig::default());
    let impact = service.planifier_impact(model.id, None).await.unwrap();

    let evaluated = service
        .completer_evaluation_impact(
            impact.id,
            ImpactEvaluation {
                satisfaction_impact: Some(8),
                competences_appliquees: Some("tableurs au quotidien".to_string()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(evaluated.statut, "impact_complete");
    assert_eq!(evaluated.satisfaction_impact, Some(8));

    let closed = service.terminer_impact(impact.id, None).await.unwrap();
    assert_eq!(closed.statut, "impact_termine");
}

#[tokio::test]
async fn impact_operations_reject_positionnement_rows() {
    let db = test_utils::setup_test_db().await.unwrap();
    let model = test_utils::create_positionnement(&db).await.unwrap();
    let service = LifecycleService::new(&db, LifecyclePolicyConfig::default());

    let err = service
        .completer_evaluation_impact(model.id, ImpactEvaluation::default(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::WrongType { .. }));

    let err = service.terminer_impact(model.id, None).await.unwrap_err();
    assert!(matches!(err, LifecycleError::WrongType { .. }));
}

#[tokio::test]
async fn stale_expected_version_is_rejected() {
    let db = test_utils::setup_test_db().await.unwrap();
    let model = test_utils::create_positionnement(&db).await.unwrap();
    let service = LifecycleService::new(&db, LifecyclePolicyConfig::default());

    // first mutation bumps version to 2
    service.valider(model.id, None, None, Some(1)).await.unwrap();

    // a client still holding version 1 loses
    let err = service
        .annuler(model.id, None, Some(1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::Repository(RepositoryError::VersionConflict {
            expected: 1,
            found: 2
        })
    ));
}

#[tokio::test]
async fn terminal_mutation_policy_locks_compte_rendu() {
    let db = test_utils::setup_test_db().await.unwrap();
    let model = test_utils::create_positionnement(&db).await.unwrap();

    let repo = RendezvousRepository::new(&db);
    repo.update(
        model.id,
        RendezvousUpdate {
            statut: Some("termine".to_string()),
            ..Default::default()
        },
        None,
    )
    .await
    .unwrap();

    let strict = LifecyclePolicyConfig {
        allow_terminal_mutation: false,
        ..Default::default()
    };
    let service = LifecycleService::new(&db, strict);
    let err = service
        .editer_compte_rendu(model.id, "synthèse".to_string(), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::TerminalLocked { .. }));

    // default policy still allows late edits
    let service = LifecycleService::new(&db, LifecyclePolicyConfig::default());
    let updated = service
        .editer_compte_rendu(model.id, "synthèse".to_string(), Some("notes".to_string()), None)
        .await
        .unwrap();
    assert_eq!(updated.synthese.as_deref(), Some("synthèse"));
    assert_eq!(updated.statut, "termine");
}

#[tokio::test]
async fn generer_programme_creates_a_catalog_entry() {
    let db = test_utils::setup_test_db().await.unwrap();
    let model = test_utils::create_positionnement(&db).await.unwrap();
    let service = LifecycleService::new(&db, LifecyclePolicyConfig::default());

    let documents = service.generer_programme_et_dossier(model.id).await.unwrap();

    let programme = ProgrammeRepository::new(&db)
        .find_by_id(documents.programme_id)
        .await
        .unwrap()
        .expect("programme should exist");
    assert!(programme.code.starts_with("PROG-"));
    assert_eq!(programme.titre, "Bureautique - initiation");
    assert_eq!(programme.beneficiaire_rendezvous_id, Some(model.id));
}

#[tokio::test]
async fn rapport_url_is_deterministic() {
    let db = test_utils::setup_test_db().await.unwrap();
    let model = test_utils::create_positionnement(&db).await.unwrap();
    let service = LifecycleService::new(&db, LifecyclePolicyConfig::default());

    let url = service.rapport_impact_url(model.id).await.unwrap();
    assert_eq!(url, format!("/rapports/impact/{}.pdf", model.id));
}
