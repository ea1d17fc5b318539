//! Project status heuristics
//!
//! A project's status blends two judgments:
//!
//! - **Phase**: which stage of the works the schedule text talks about most.
//!   Summary-row names are scored against a keyword table per phase.
//! - **Timeliness**: whether progress clears the phase's thresholds.
//!   Later phases demand higher progress to count as on time.
//!
//! A project whose overall progress reached 100% is simply `Completed`.
//!
//! # Example
//!
//! ```rust
//! use canteiro_core::{Origin, Task};
//! use canteiro_core::status::{classify, Phase, ProjectStatus, StatusRules, Timeliness};
//!
//! let tasks = vec![
//!     Task::new("Concretagem", Origin::Execution).level(3).summary("Obra civil"),
//! ];
//! let status = classify(&tasks, 75, &StatusRules::default());
//! assert_eq!(
//!     status,
//!     ProjectStatus::Active { phase: Phase::Execution, timeliness: Timeliness::OnTime }
//! );
//! assert_eq!(status.to_string(), "Execução - No Prazo");
//! ```

use serde::{Deserialize, Serialize};

use crate::{fold_text, Origin, Task};

// ============================================================================
// Core Types
// ============================================================================

/// Stage of the works
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Licensing, procurement, mobilization
    Preliminary,
    /// Executive design and surveys
    ExecutiveDesign,
    /// Civil works and assembly
    Execution,
    /// Testing, energization, handover
    Commissioning,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Preliminary,
        Phase::ExecutiveDesign,
        Phase::Execution,
        Phase::Commissioning,
    ];

    /// Phase reported when keyword scoring is inconclusive
    pub const FALLBACK: Phase = Phase::ExecutiveDesign;

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Preliminary => "Procedimentos Preliminares",
            Phase::ExecutiveDesign => "Projetos Executivos",
            Phase::Execution => "Execução",
            Phase::Commissioning => "Comissionamento",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Progress judgment within a phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeliness {
    Ahead,
    OnTime,
    Behind,
}

impl Timeliness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeliness::Ahead => "Adiantado",
            Timeliness::OnTime => "No Prazo",
            Timeliness::Behind => "Atrasado",
        }
    }
}

impl std::fmt::Display for Timeliness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Human-readable project status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Overall progress reached 100%
    Completed,
    Active { phase: Phase, timeliness: Timeliness },
}

impl ProjectStatus {
    pub fn phase(&self) -> Option<Phase> {
        match self {
            ProjectStatus::Completed => None,
            ProjectStatus::Active { phase, .. } => Some(*phase),
        }
    }

    pub fn timeliness(&self) -> Option<Timeliness> {
        match self {
            ProjectStatus::Completed => None,
            ProjectStatus::Active { timeliness, .. } => Some(*timeliness),
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStatus::Completed => write!(f, "Concluído"),
            ProjectStatus::Active { phase, timeliness } => write!(f, "{} - {}", phase, timeliness),
        }
    }
}

// ============================================================================
// Rules
// ============================================================================

/// Progress thresholds for one phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// At or above: ahead
    pub ahead: u8,
    /// At or above: on time; below: behind
    pub on_time: u8,
}

impl Thresholds {
    pub const fn new(ahead: u8, on_time: u8) -> Self {
        Self { ahead, on_time }
    }

    pub fn classify(&self, progress: u8) -> Timeliness {
        match progress {
            p if p >= self.ahead => Timeliness::Ahead,
            p if p >= self.on_time => Timeliness::OnTime,
            _ => Timeliness::Behind,
        }
    }
}

/// Threshold pair per phase
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseThresholds {
    pub preliminary: Thresholds,
    pub executive_design: Thresholds,
    pub execution: Thresholds,
    pub commissioning: Thresholds,
}

impl Default for PhaseThresholds {
    fn default() -> Self {
        Self {
            preliminary: Thresholds::new(80, 50),
            executive_design: Thresholds::new(85, 60),
            execution: Thresholds::new(90, 70),
            commissioning: Thresholds::new(95, 80),
        }
    }
}

impl PhaseThresholds {
    pub fn get(&self, phase: Phase) -> Thresholds {
        match phase {
            Phase::Preliminary => self.preliminary,
            Phase::ExecutiveDesign => self.executive_design,
            Phase::Execution => self.execution,
            Phase::Commissioning => self.commissioning,
        }
    }
}

/// Keyword list per phase
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseKeywords {
    pub preliminary: Vec<String>,
    pub executive_design: Vec<String>,
    pub execution: Vec<String>,
    pub commissioning: Vec<String>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| (*w).to_string()).collect()
}

impl Default for PhaseKeywords {
    fn default() -> Self {
        Self {
            preliminary: words(&[
                "licenciamento",
                "licença",
                "licitação",
                "contratação",
                "preliminar",
                "procedimentos",
                "mobilização",
                "autorização",
                "desapropriação",
            ]),
            executive_design: words(&[
                "projeto",
                "executivo",
                "estudo",
                "levantamento",
                "topografia",
                "sondagem",
                "memorial",
                "dimensionamento",
            ]),
            execution: words(&[
                "obra",
                "civil",
                "montagem",
                "construção",
                "instalação",
                "fornecimentos",
                "equipamentos",
                "fundação",
            ]),
            commissioning: words(&[
                "comissionamento",
                "teste",
                "energização",
                "partida",
                "operação assistida",
                "entrega",
                "as built",
                "vistoria final",
            ]),
        }
    }
}

impl PhaseKeywords {
    pub fn get(&self, phase: Phase) -> &[String] {
        match phase {
            Phase::Preliminary => &self.preliminary,
            Phase::ExecutiveDesign => &self.executive_design,
            Phase::Execution => &self.execution,
            Phase::Commissioning => &self.commissioning,
        }
    }
}

/// Tunable status heuristics (`[status]` in the config file)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusRules {
    pub keywords: PhaseKeywords,
    pub thresholds: PhaseThresholds,
    /// Projects with execution data below this progress are behind
    pub behind_below: u8,
    /// Oversight-only projects at or above this progress are ahead
    pub ahead_at: u8,
}

impl Default for StatusRules {
    fn default() -> Self {
        Self {
            keywords: PhaseKeywords::default(),
            thresholds: PhaseThresholds::default(),
            behind_below: 40,
            ahead_at: 90,
        }
    }
}

// ============================================================================
// Scoring
// ============================================================================

/// Keyword hit count per phase
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseScores {
    pub preliminary: usize,
    pub executive_design: usize,
    pub execution: usize,
    pub commissioning: usize,
}

impl PhaseScores {
    pub fn get(&self, phase: Phase) -> usize {
        match phase {
            Phase::Preliminary => self.preliminary,
            Phase::ExecutiveDesign => self.executive_design,
            Phase::Execution => self.execution,
            Phase::Commissioning => self.commissioning,
        }
    }

    fn set(&mut self, phase: Phase, score: usize) {
        match phase {
            Phase::Preliminary => self.preliminary = score,
            Phase::ExecutiveDesign => self.executive_design = score,
            Phase::Execution => self.execution = score,
            Phase::Commissioning => self.commissioning = score,
        }
    }

    /// The strictly highest-scoring phase; ties and all-zero fall back
    pub fn winner(&self) -> Phase {
        let best = Phase::ALL.iter().map(|p| self.get(*p)).max().unwrap_or(0);
        if best == 0 {
            return Phase::FALLBACK;
        }
        let mut leaders = Phase::ALL.iter().filter(|p| self.get(**p) == best);
        match (leaders.next(), leaders.next()) {
            (Some(phase), None) => *phase,
            _ => Phase::FALLBACK,
        }
    }
}

/// Count keyword occurrences in a block of text
pub fn score_text(text: &str, keywords: &PhaseKeywords) -> PhaseScores {
    let text = fold_text(text);
    let mut scores = PhaseScores::default();
    for phase in Phase::ALL {
        let score = keywords
            .get(phase)
            .iter()
            .map(|kw| fold_text(kw.trim()))
            .filter(|kw| !kw.is_empty())
            .map(|kw| text.matches(kw.as_str()).count())
            .sum();
        scores.set(phase, score);
    }
    scores
}

/// Join the non-empty summary names of a task list
pub fn summary_text<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> String {
    tasks
        .into_iter()
        .map(|t| t.parent_summary.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Phase a task list is in, by keyword score
pub fn detect_phase<'a>(tasks: impl IntoIterator<Item = &'a Task>, rules: &StatusRules) -> Phase {
    score_text(&summary_text(tasks), &rules.keywords).winner()
}

// ============================================================================
// Classification
// ============================================================================

/// Status for a project's unified task list at the given overall progress
pub fn classify<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    progress: u8,
    rules: &StatusRules,
) -> ProjectStatus {
    if progress >= 100 {
        return ProjectStatus::Completed;
    }

    let tasks: Vec<&Task> = tasks.into_iter().collect();
    let has_execution = tasks.iter().any(|t| t.origin == Origin::Execution);
    let has_oversight = tasks.iter().any(|t| t.origin == Origin::Oversight);

    let phase = detect_phase(tasks.iter().copied(), rules);
    let mut timeliness = rules.thresholds.get(phase).classify(progress);

    if has_execution && progress < rules.behind_below {
        timeliness = Timeliness::Behind;
    } else if !has_execution && has_oversight && progress >= rules.ahead_at {
        timeliness = Timeliness::Ahead;
    }

    ProjectStatus::Active { phase, timeliness }
}

// ============================================================================
// Schedule deviation
// ============================================================================

/// Classification of actual-minus-planned progress, in percentage points
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationStatus {
    /// Deviation >= 0
    OnTrack,
    /// -5 <= deviation < 0
    AtRisk,
    /// Deviation < -5
    Behind,
}

impl DeviationStatus {
    pub fn from_deviation(points: f64) -> Self {
        match points {
            d if d >= 0.0 => DeviationStatus::OnTrack,
            d if d >= -5.0 => DeviationStatus::AtRisk,
            _ => DeviationStatus::Behind,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviationStatus::OnTrack => "No Prazo",
            DeviationStatus::AtRisk => "Em Risco",
            DeviationStatus::Behind => "Atrasado",
        }
    }
}

impl std::fmt::Display for DeviationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn exec(summary: &str) -> Task {
        Task::new("t", Origin::Execution).level(3).summary(summary)
    }

    fn over(summary: &str) -> Task {
        Task::new("t", Origin::Oversight).level(3).summary(summary)
    }

    fn active(phase: Phase, timeliness: Timeliness) -> ProjectStatus {
        ProjectStatus::Active { phase, timeliness }
    }

    #[test]
    fn completed_ignores_phase() {
        let tasks = vec![exec("Comissionamento e testes")];
        assert_eq!(
            classify(&tasks, 100, &StatusRules::default()),
            ProjectStatus::Completed
        );
        assert_eq!(ProjectStatus::Completed.to_string(), "Concluído");
    }

    #[test]
    fn no_keywords_falls_back_to_executive_design() {
        let tasks = vec![over("Diversos"), over("")];
        let status = classify(&tasks, 70, &StatusRules::default());
        assert_eq!(status.phase(), Some(Phase::ExecutiveDesign));
        assert_eq!(status, active(Phase::ExecutiveDesign, Timeliness::OnTime));
    }

    #[test]
    fn tie_falls_back_to_executive_design() {
        // one execution hit ("obra"), one commissioning hit ("entrega")
        let scores = score_text("obra entrega", &PhaseKeywords::default());
        assert_eq!(scores.execution, 1);
        assert_eq!(scores.commissioning, 1);
        assert_eq!(scores.winner(), Phase::ExecutiveDesign);
    }

    #[test]
    fn scoring_counts_occurrences_accent_insensitive() {
        let scores = score_text(
            "Obra Civil - FUNDACAO; Construção do galpão; montagem",
            &PhaseKeywords::default(),
        );
        assert_eq!(scores.execution, 5);
        assert_eq!(scores.winner(), Phase::Execution);
    }

    #[test]
    fn execution_thresholds() {
        let tasks = vec![exec("Obra civil")];
        let rules = StatusRules::default();
        assert_eq!(classify(&tasks, 95, &rules), active(Phase::Execution, Timeliness::Ahead));
        assert_eq!(classify(&tasks, 90, &rules), active(Phase::Execution, Timeliness::Ahead));
        assert_eq!(classify(&tasks, 70, &rules), active(Phase::Execution, Timeliness::OnTime));
        assert_eq!(classify(&tasks, 69, &rules), active(Phase::Execution, Timeliness::Behind));
    }

    #[test]
    fn commissioning_thresholds() {
        let tasks = vec![over("Comissionamento"), over("Testes de comissionamento")];
        let rules = StatusRules::default();
        assert_eq!(classify(&tasks, 95, &rules), active(Phase::Commissioning, Timeliness::Ahead));
        assert_eq!(classify(&tasks, 89, &rules), active(Phase::Commissioning, Timeliness::OnTime));
        assert_eq!(classify(&tasks, 79, &rules), active(Phase::Commissioning, Timeliness::Behind));
    }

    #[test]
    fn preliminary_thresholds() {
        let tasks = vec![over("Licenciamento ambiental")];
        let rules = StatusRules::default();
        assert_eq!(classify(&tasks, 80, &rules), active(Phase::Preliminary, Timeliness::Ahead));
        assert_eq!(classify(&tasks, 50, &rules), active(Phase::Preliminary, Timeliness::OnTime));
        assert_eq!(classify(&tasks, 49, &rules), active(Phase::Preliminary, Timeliness::Behind));
    }

    #[test]
    fn execution_data_below_forty_is_behind() {
        let mut rules = StatusRules::default();
        rules.thresholds.preliminary = Thresholds::new(60, 30);

        let tasks = vec![over("Licenciamento"), exec("Licenciamento")];
        assert_eq!(classify(&tasks, 35, &rules), active(Phase::Preliminary, Timeliness::Behind));
        assert_eq!(classify(&tasks, 45, &rules), active(Phase::Preliminary, Timeliness::OnTime));

        let oversight_only = vec![over("Licenciamento")];
        assert_eq!(
            classify(&oversight_only, 35, &rules),
            active(Phase::Preliminary, Timeliness::OnTime)
        );
    }

    #[test]
    fn oversight_only_at_ninety_is_ahead() {
        // commissioning would need 95 to be ahead
        let tasks = vec![over("Comissionamento")];
        let rules = StatusRules::default();
        assert_eq!(classify(&tasks, 90, &rules), active(Phase::Commissioning, Timeliness::Ahead));

        // not applied once execution data exists
        let mixed = vec![over("Comissionamento"), exec("Comissionamento")];
        assert_eq!(classify(&mixed, 90, &rules), active(Phase::Commissioning, Timeliness::OnTime));
    }

    #[test]
    fn custom_keywords_override_table() {
        let mut rules = StatusRules::default();
        rules.keywords.commissioning = vec!["pintura".into()];
        let tasks = vec![exec("Pintura final"), exec("Pintura externa")];
        assert_eq!(detect_phase(&tasks, &rules), Phase::Commissioning);
    }

    #[test]
    fn status_display() {
        assert_eq!(
            active(Phase::ExecutiveDesign, Timeliness::Behind).to_string(),
            "Projetos Executivos - Atrasado"
        );
        assert_eq!(
            active(Phase::Preliminary, Timeliness::Ahead).to_string(),
            "Procedimentos Preliminares - Adiantado"
        );
    }

    #[test]
    fn deviation_boundaries() {
        assert_eq!(DeviationStatus::from_deviation(3.0), DeviationStatus::OnTrack);
        assert_eq!(DeviationStatus::from_deviation(0.0), DeviationStatus::OnTrack);
        assert_eq!(DeviationStatus::from_deviation(-5.0), DeviationStatus::AtRisk);
        assert_eq!(DeviationStatus::from_deviation(-5.1), DeviationStatus::Behind);
        assert_eq!(format!("{}", DeviationStatus::AtRisk), "Em Risco");
    }
}
