//! Rapport de session d'interactions
//!
//! Collecte le résultat de chaque événement rejoué (survol, clic, glisser du marqueur,
//! recherche) et l'affiche ou le sauvegarde en JSON.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use parcel_engine::{EmptyReason, Outcome};
use serde::Serialize;

/// Statut global de la session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionStatus {
    /// Toutes les interactions ont été traitées sans anomalie
    Clean,
    /// Groupes orphelins ou recherches invalides rencontrés
    Degraded,
    /// Aucune interaction traitée
    Idle,
}

/// Type d'interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Interaction {
    Hover,
    Click,
    Drag,
}

/// Anomalie rencontrée pendant la session
#[derive(Debug, Clone, Serialize)]
pub struct SessionWarning {
    /// Index de l'événement dans la session
    pub event: usize,
    /// Groupe concerné (optionnel)
    pub group_id: Option<String>,
    pub message: String,
}

/// Statistiques par groupe de parcelles
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupStats {
    pub hovers: usize,
    pub selections: usize,
}

impl GroupStats {
    pub fn total(&self) -> usize {
        self.hovers + self.selections
    }
}

/// Rapport complet de session
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    /// Nom de la scène rejouée
    pub scene: String,
    pub duration_secs: f64,
    pub status: SessionStatus,

    /// Événements reçus, événements de contrôle inclus
    pub events: usize,
    /// Événements ignorés (carte non chargée)
    pub ignored: usize,

    pub hovers: usize,
    pub hover_matches: usize,
    pub clicks: usize,
    pub drags: usize,
    /// Clics et glisser ayant abouti à une sélection
    pub selections: usize,

    /// Interactions sans feature sous le pointeur
    pub empty: usize,
    /// Sous-parcelles sans identifiant de groupe
    pub missing_group_id: usize,
    /// Groupes absents de la source des parcelles
    pub orphans: usize,

    pub searches: usize,
    pub search_failures: usize,

    pub by_group: HashMap<String, GroupStats>,
    pub warnings: Vec<SessionWarning>,
}

impl Default for SessionReport {
    fn default() -> Self {
        Self {
            scene: String::new(),
            duration_secs: 0.0,
            status: SessionStatus::Idle,
            events: 0,
            ignored: 0,
            hovers: 0,
            hover_matches: 0,
            clicks: 0,
            drags: 0,
            selections: 0,
            empty: 0,
            missing_group_id: 0,
            orphans: 0,
            searches: 0,
            search_failures: 0,
            by_group: HashMap::new(),
            warnings: Vec::new(),
        }
    }
}

impl SessionReport {
    /// Crée un nouveau rapport pour une scène
    pub fn new(scene: &str) -> Self {
        Self {
            scene: scene.to_string(),
            ..Default::default()
        }
    }

    /// Enregistre le résultat d'une interaction (`None` = ignorée)
    pub fn record_outcome(&mut self, interaction: Interaction, outcome: Option<&Outcome>) {
        let index = self.events;
        self.events += 1;

        let Some(outcome) = outcome else {
            self.ignored += 1;
            return;
        };

        match interaction {
            Interaction::Hover => self.hovers += 1,
            Interaction::Click => self.clicks += 1,
            Interaction::Drag => self.drags += 1,
        }

        match outcome {
            Outcome::Matched(group_id) => {
                let stats = self.by_group.entry(group_id.to_string()).or_default();
                if interaction == Interaction::Hover {
                    self.hover_matches += 1;
                    stats.hovers += 1;
                } else {
                    self.selections += 1;
                    stats.selections += 1;
                }
            }
            Outcome::Empty(EmptyReason::NoFeature) => self.empty += 1,
            Outcome::Empty(EmptyReason::MissingGroupId) => {
                self.missing_group_id += 1;
                self.warnings.push(SessionWarning {
                    event: index,
                    group_id: None,
                    message: "Sub-parcel without group id".to_string(),
                });
            }
            Outcome::Empty(EmptyReason::OrphanGroup(group_id)) => {
                self.orphans += 1;
                self.warnings.push(SessionWarning {
                    event: index,
                    group_id: Some(group_id.to_string()),
                    message: "Group missing from parcel source".to_string(),
                });
            }
        }
    }

    /// Enregistre un événement de contrôle (chargement de la carte, fermeture du panneau)
    pub fn record_control(&mut self) {
        self.events += 1;
    }

    /// Enregistre une recherche de coordonnées
    pub fn record_search(&mut self, query: &str, error: Option<&str>) {
        let index = self.events;
        self.events += 1;
        self.searches += 1;
        if let Some(error) = error {
            self.search_failures += 1;
            self.warnings.push(SessionWarning {
                event: index,
                group_id: None,
                message: format!("Search {:?} failed: {}", query, error),
            });
        }
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        let handled = self.hovers + self.clicks + self.drags + self.searches;
        self.status = if handled == 0 {
            SessionStatus::Idle
        } else if self.orphans > 0 || self.missing_group_id > 0 || self.search_failures > 0 {
            SessionStatus::Degraded
        } else {
            SessionStatus::Clean
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("SESSION REPORT - {}", self.scene);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!("Events: {} received, {} ignored", self.events, self.ignored);
        println!(
            "Hover: {} moves, {} on a parcel",
            self.hovers, self.hover_matches
        );
        println!(
            "Selection: {} clicks, {} drags, {} selected",
            self.clicks, self.drags, self.selections
        );
        println!(
            "Empty: {} nothing, {} without group, {} orphans",
            self.empty, self.missing_group_id, self.orphans
        );
        if self.searches > 0 {
            println!(
                "Search: {} queries, {} failed",
                self.searches, self.search_failures
            );
        }

        if !self.by_group.is_empty() {
            println!("\n--- BY GROUP ---");
            let mut groups: Vec<_> = self.by_group.iter().collect();
            groups.sort_by_key(|(k, _)| k.as_str());
            for (group_id, stats) in groups {
                println!(
                    "  {}: {} hovers, {} selections",
                    group_id, stats.hovers, stats.selections
                );
            }
        }

        if !self.warnings.is_empty() {
            println!("\n--- WARNINGS ({}) ---", self.warnings.len());
            for w in self.warnings.iter().take(10) {
                match &w.group_id {
                    Some(gid) => println!("  [#{}:{}] {}", w.event, gid, w.message),
                    None => println!("  [#{}] {}", w.event, w.message),
                }
            }
            if self.warnings.len() > 10 {
                println!("  ... and {} more", self.warnings.len() - 10);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {} selected, {} hovered, {} empty, {} orphans",
            self.scene, self.selections, self.hover_matches, self.empty, self.orphans
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parcel_engine::GroupId;

    fn matched(gid: &str) -> Outcome {
        Outcome::Matched(GroupId(gid.to_string()))
    }

    #[test]
    fn test_session_report_default() {
        let report = SessionReport::default();
        assert_eq!(report.status, SessionStatus::Idle);
        assert_eq!(report.events, 0);
        assert!(report.by_group.is_empty());
    }

    #[test]
    fn test_record_matches_by_group() {
        let mut report = SessionReport::new("scene");
        report.record_outcome(Interaction::Hover, Some(&matched("G1")));
        report.record_outcome(Interaction::Click, Some(&matched("G1")));
        report.record_outcome(Interaction::Drag, Some(&matched("G2")));

        assert_eq!(report.hover_matches, 1);
        assert_eq!(report.selections, 2);
        assert_eq!(report.by_group.get("G1").unwrap().total(), 2);
        assert_eq!(report.by_group.get("G2").unwrap().selections, 1);
    }

    #[test]
    fn test_ignored_events() {
        let mut report = SessionReport::new("scene");
        report.record_outcome(Interaction::Click, None);
        assert_eq!(report.ignored, 1);
        assert_eq!(report.clicks, 0);
        report.finalize();
        assert_eq!(report.status, SessionStatus::Idle);
    }

    #[test]
    fn test_orphan_degrades_session() {
        let mut report = SessionReport::new("scene");
        report.record_outcome(Interaction::Click, Some(&matched("G1")));
        report.record_outcome(
            Interaction::Click,
            Some(&Outcome::Empty(EmptyReason::OrphanGroup(GroupId("G9".into())))),
        );
        report.finalize();

        assert_eq!(report.orphans, 1);
        assert_eq!(report.status, SessionStatus::Degraded);
        assert_eq!(report.warnings[0].event, 1);
        assert_eq!(report.warnings[0].group_id.as_deref(), Some("G9"));
    }

    #[test]
    fn test_empty_click_is_clean() {
        let mut report = SessionReport::new("scene");
        report.record_control();
        report.record_outcome(
            Interaction::Click,
            Some(&Outcome::Empty(EmptyReason::NoFeature)),
        );
        report.finalize();

        assert_eq!(report.events, 2);
        assert_eq!(report.empty, 1);
        assert_eq!(report.status, SessionStatus::Clean);
    }

    #[test]
    fn test_failed_search_warns() {
        let mut report = SessionReport::new("scene");
        report.record_search("10.78, 106.7", None);
        report.record_search("hello", Some("not a coordinate"));
        report.finalize();

        assert_eq!(report.searches, 2);
        assert_eq!(report.search_failures, 1);
        assert_eq!(report.status, SessionStatus::Degraded);
    }

    #[test]
    fn test_summary() {
        let mut report = SessionReport::new("district-1");
        report.record_outcome(Interaction::Click, Some(&matched("G1")));
        let summary = report.summary();
        assert!(summary.contains("district-1"));
        assert!(summary.contains("1 selected"));
    }
}
