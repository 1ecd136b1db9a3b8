//! Programme catalog seeding
//!
//! Seeds the programmes table with the baseline catalog entries so a fresh
//! installation has something to plan positionnements against. Existing
//! codes are left untouched.

use anyhow::Result;
use sea_orm::DatabaseConnection;

use crate::repositories::{CreateProgrammeRequest, ProgrammeRepository};

struct CatalogEntry {
    code: &'static str,
    titre: &'static str,
    description: &'static str,
    duree_heures: i32,
    niveau: &'static str,
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        code: "BUR-INIT",
        titre: "Bureautique - initiation",
        description: "Prise en main des outils bureautiques courants",
        duree_heures: 21,
        niveau: "debutant",
    },
    CatalogEntry {
        code: "BUR-PERF",
        titre: "Bureautique - perfectionnement",
        description: "Automatisation et usages avancés des outils bureautiques",
        duree_heures: 14,
        niveau: "intermediaire",
    },
    CatalogEntry {
        code: "NUM-BASE",
        titre: "Compétences numériques de base",
        description: "Socle de compétences numériques du référentiel européen",
        duree_heures: 35,
        niveau: "debutant",
    },
    CatalogEntry {
        code: "FLE-PRO",
        titre: "Français langue étrangère professionnel",
        description: "Français à visée professionnelle, communication en situation de travail",
        duree_heures: 60,
        niveau: "intermediaire",
    },
];

/// Seeds the programmes table with the baseline catalog.
///
/// Checks each catalog code and creates the entry when missing, so the
/// function is safe to run at every startup.
pub async fn seed_programme_catalog(db: &DatabaseConnection) -> Result<()> {
    let repo = ProgrammeRepository::new(db);

    for entry in CATALOG {
        match repo.find_by_code(entry.code).await {
            Ok(Some(_)) => {
                log::info!("Programme '{}' already exists, skipping", entry.code);
                continue;
            }
            Ok(None) => {
                log::info!("Creating programme: {}", entry.code);
                let request = CreateProgrammeRequest {
                    code: entry.code.to_string(),
                    titre: entry.titre.to_string(),
                    description: Some(entry.description.to_string()),
                    duree_heures: Some(entry.duree_heures),
                    niveau: Some(entry.niveau.to_string()),
                    ..Default::default()
                };
                if let Err(e) = repo.create(request).await {
                    log::error!("Failed to create programme '{}': {}", entry.code, e);
                    return Err(e.into());
                }
            }
            Err(e) => {
                log::error!("Error checking if programme '{}' exists: {}", entry.code, e);
                return Err(e.into());
            }
        }
    }

    log::info!("Programme catalog seeding completed successfully");
    Ok(())
}
