//! Investigation planning types for the Detective Engine.
//!
//! These types represent the **mechanical** aspect of investigation:
//! - What steps could be taken to resolve gaps
//! - What actions the library can perform
//!
//! **Policy** decisions (token budgets, iteration limits, retry logic)
//! belong in the caller's orchestrator, not here.
//!
//! # Design Principle: Mechanism vs Policy
//!
//! | Mechanism (Library) | Policy (Caller) |
//! |---------------------|-----------------|
//! | plan_investigation() | max_iterations |
//! | execute_step() | token_budget |
//! | InvestigationPlan | ghost_gap_prevention |
//! | InvestigationStep | when to give up |

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::extraction::{GapKind, MissingField};

/// A suggested investigation step (pure data, no behavior).
///
/// The library suggests steps; the caller decides whether to execute them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestigationStep {
    /// ID of the gap being addressed
    pub gap_id: Uuid,

    /// Human-readable field name (e.g., "contact email")
    pub field: String,

    /// Original gap query text, kept for reference/logging.
    pub original_query: String,

    /// Recommended action to resolve this gap
    pub recommended_action: InvestigationAction,

    /// Why this action was recommended
    pub rationale: Option<String>,
}

impl InvestigationStep {
    /// Create a new investigation step.
    pub fn new(
        gap_id: Uuid,
        field: impl Into<String>,
        query: impl Into<String>,
        action: InvestigationAction,
    ) -> Self {
        Self {
            gap_id,
            field: field.into(),
            original_query: query.into(),
            recommended_action: action,
            rationale: None,
        }
    }

    /// Add a rationale for this step.
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    /// Build the default step for a gap: pick an action from the gap's
    /// `kind` and any `hints` it carries, per §4.8.
    ///
    /// - `Entity`/`Semantic` gaps become `HybridSearch` with the kind's
    ///   recommended semantic weight.
    /// - `Structural` gaps become `FetchUrls` when the gap carries concrete
    ///   URL hints, or `CrawlSite` rooted at the first hint (or the bare
    ///   query text, if the caller's `root_hint` is supplied) otherwise.
    pub fn from_gap(gap_id: Uuid, gap: &MissingField, root_hint: Option<&str>) -> Self {
        let action = match gap.query.kind {
            GapKind::Entity | GapKind::Semantic => InvestigationAction::HybridSearch {
                query: gap.query.text.clone(),
                semantic_weight: gap.query.kind.recommended_semantic_weight(),
                limit: 10,
            },
            GapKind::Structural => {
                let urls: Vec<String> = gap.query.hints.clone();
                if !urls.is_empty() {
                    InvestigationAction::FetchUrls { urls }
                } else {
                    let root = root_hint.unwrap_or(gap.query.text.as_str()).to_string();
                    InvestigationAction::CrawlSite {
                        root,
                        max_depth: 1,
                        include_globs: Vec::new(),
                    }
                }
            }
        };

        Self::new(gap_id, &gap.field, &gap.query.text, action).with_rationale(format!(
            "gap kind {:?} mapped to {}",
            gap.query.kind,
            action_type_of(&action)
        ))
    }
}

fn action_type_of(action: &InvestigationAction) -> &'static str {
    action.action_type()
}

/// Mechanical actions the library can perform.
///
/// These are the primitives available for gap resolution.
/// The library executes them; the caller decides when and how often.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InvestigationAction {
    /// Hybrid search combining semantic and keyword search over the
    /// indexed corpus.
    ///
    /// `semantic_weight` controls the balance:
    /// - 0.0 = pure keyword (good for entities like emails, names)
    /// - 1.0 = pure semantic (good for concepts)
    HybridSearch {
        /// The search query
        query: String,
        /// Weight for semantic vs keyword (0.0-1.0)
        semantic_weight: f32,
        /// Maximum results to return
        limit: usize,
    },

    /// Fetch one or more specific URLs directly.
    ///
    /// Use when the gap carries concrete URL hints.
    FetchUrls {
        /// URLs to fetch
        urls: Vec<String>,
    },

    /// Crawl a site looking for specific content.
    ///
    /// Use for structural gaps that require exploring beyond indexed pages.
    CrawlSite {
        /// Root URL to crawl from
        root: String,
        /// Maximum link-following depth from `root`
        max_depth: usize,
        /// Optional glob patterns restricting which discovered URLs to follow
        include_globs: Vec<String>,
    },

    /// Search external sources (e.g., Tavily), outside the indexed corpus.
    ///
    /// Supplemental to the spec's three actions: lets a caller's policy
    /// prefer paid web search over re-crawling when indexed content is
    /// exhausted.
    ExternalSearch {
        /// Search query
        query: String,
        /// Number of results
        num_results: usize,
    },
}

impl InvestigationAction {
    /// Create a hybrid search action with default parameters.
    pub fn hybrid_search(query: impl Into<String>) -> Self {
        Self::HybridSearch {
            query: query.into(),
            semantic_weight: 0.6,
            limit: 10,
        }
    }

    /// Create a hybrid search optimized for entity queries (lexical-heavy).
    ///
    /// Use for: emails, phone numbers, names, dates
    pub fn entity_search(query: impl Into<String>) -> Self {
        Self::HybridSearch {
            query: query.into(),
            semantic_weight: GapKind::Entity.recommended_semantic_weight(),
            limit: 10,
        }
    }

    /// Create a hybrid search optimized for semantic queries.
    ///
    /// Use for: concepts, descriptions, abstract queries
    pub fn semantic_search(query: impl Into<String>) -> Self {
        Self::HybridSearch {
            query: query.into(),
            semantic_weight: GapKind::Semantic.recommended_semantic_weight(),
            limit: 10,
        }
    }

    /// Create a fetch action for one URL.
    pub fn fetch_url(url: impl Into<String>) -> Self {
        Self::FetchUrls {
            urls: vec![url.into()],
        }
    }

    /// Create a fetch action for multiple URLs.
    pub fn fetch_urls(urls: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::FetchUrls {
            urls: urls.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a site crawl action rooted at `root`, depth 1 by default.
    pub fn crawl_site(root: impl Into<String>) -> Self {
        Self::CrawlSite {
            root: root.into(),
            max_depth: 1,
            include_globs: Vec::new(),
        }
    }

    /// Create an external search action.
    pub fn external_search(query: impl Into<String>) -> Self {
        Self::ExternalSearch {
            query: query.into(),
            num_results: 5,
        }
    }

    /// Get the action type as a string (for logging).
    pub fn action_type(&self) -> &'static str {
        match self {
            InvestigationAction::HybridSearch { .. } => "hybrid_search",
            InvestigationAction::FetchUrls { .. } => "fetch_urls",
            InvestigationAction::CrawlSite { .. } => "crawl_site",
            InvestigationAction::ExternalSearch { .. } => "external_search",
        }
    }
}

/// A plan containing suggested investigation steps.
///
/// The library generates plans; the caller executes them (or not).
/// This separation allows the caller to:
/// - Filter steps based on policy (skip expensive actions)
/// - Prioritize steps (entity gaps before semantic gaps)
/// - Track attempts per gap (ghost gap prevention)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvestigationPlan {
    /// Suggested steps to resolve gaps
    pub steps: Vec<InvestigationStep>,
}

impl InvestigationPlan {
    /// Create an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step to the plan.
    pub fn add_step(&mut self, step: InvestigationStep) {
        self.steps.push(step);
    }

    /// Add a step (builder pattern).
    pub fn with_step(mut self, step: InvestigationStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Check if the plan is empty.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Get the number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Iterate over steps.
    pub fn iter(&self) -> impl Iterator<Item = &InvestigationStep> {
        self.steps.iter()
    }

    /// Get steps for a specific gap.
    pub fn steps_for_gap(&self, gap_id: Uuid) -> impl Iterator<Item = &InvestigationStep> {
        self.steps.iter().filter(move |s| s.gap_id == gap_id)
    }

    /// Get steps by action type.
    pub fn steps_by_action<'a>(
        &'a self,
        action_type: &'a str,
    ) -> impl Iterator<Item = &'a InvestigationStep> {
        self.steps
            .iter()
            .filter(move |s| s.recommended_action.action_type() == action_type)
    }
}

/// Result of executing an investigation step.
///
/// Pure observation of what happened - no policy implications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// The step that was executed
    pub step: InvestigationStep,

    /// URLs newly fetched and stored by this step (not previously cached,
    /// or whose content changed, per the content-hash-based re-entrancy
    /// rule).
    pub new_pages_urls: Vec<String>,

    /// URLs surfaced by this step as candidates for the caller's own
    /// follow-up, whether or not they were fetched (e.g. links discovered
    /// mid-crawl beyond `max_depth`, or search hits not worth auto-fetching).
    pub candidate_urls: Vec<String>,

    /// Whether the step found potentially useful content
    pub found_content: bool,

    /// Tokens used (if applicable)
    pub tokens_used: Option<usize>,

    /// Execution duration in milliseconds
    pub duration_ms: Option<u64>,

    /// Error message if the step failed
    pub error: Option<String>,
}

impl StepResult {
    /// Create a successful result.
    pub fn success(
        step: InvestigationStep,
        new_pages_urls: Vec<String>,
        candidate_urls: Vec<String>,
    ) -> Self {
        let found_content = !new_pages_urls.is_empty() || !candidate_urls.is_empty();
        Self {
            step,
            new_pages_urls,
            candidate_urls,
            found_content,
            tokens_used: None,
            duration_ms: None,
            error: None,
        }
    }

    /// Create a failed result.
    pub fn failure(step: InvestigationStep, error: impl Into<String>) -> Self {
        Self {
            step,
            new_pages_urls: Vec::new(),
            candidate_urls: Vec::new(),
            found_content: false,
            tokens_used: None,
            duration_ms: None,
            error: Some(error.into()),
        }
    }

    /// Set tokens used.
    pub fn with_tokens(mut self, tokens: usize) -> Self {
        self.tokens_used = Some(tokens);
        self
    }

    /// Set duration.
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Check if the step was successful.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Check if the step found content.
    pub fn has_content(&self) -> bool {
        self.found_content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::extraction::GapQuery;

    #[test]
    fn test_investigation_step_creation() {
        let gap_id = Uuid::new_v4();
        let step = InvestigationStep::new(
            gap_id,
            "contact email",
            "the volunteer coordinator email",
            InvestigationAction::entity_search("volunteer coordinator email"),
        )
        .with_rationale("Entity query, using lexical-heavy search");

        assert_eq!(step.gap_id, gap_id);
        assert_eq!(step.field, "contact email");
        assert!(step.rationale.is_some());
    }

    #[test]
    fn test_action_types() {
        assert_eq!(
            InvestigationAction::hybrid_search("test").action_type(),
            "hybrid_search"
        );
        assert_eq!(
            InvestigationAction::fetch_url("http://example.com").action_type(),
            "fetch_urls"
        );
    }

    #[test]
    fn test_gap_kind_classification() {
        assert_eq!(
            GapKind::classify("the contact email for volunteers"),
            GapKind::Entity
        );
        assert_eq!(
            GapKind::classify("what services do they offer"),
            GapKind::Semantic
        );
        assert_eq!(GapKind::classify("phone number: 555-1234"), GapKind::Entity);
    }

    #[test]
    fn test_from_gap_entity_uses_hybrid_search() {
        let gap_id = Uuid::new_v4();
        let gap = MissingField::from_query(
            "contact email",
            GapQuery::with_kind("volunteer coordinator email", GapKind::Entity),
        );
        let step = InvestigationStep::from_gap(gap_id, &gap, None);
        match step.recommended_action {
            InvestigationAction::HybridSearch { semantic_weight, .. } => {
                assert_eq!(semantic_weight, 0.3);
            }
            other => panic!("expected HybridSearch, got {other:?}"),
        }
    }

    #[test]
    fn test_from_gap_semantic_weight_is_point_eight() {
        let gap_id = Uuid::new_v4();
        let gap = MissingField::from_query(
            "mission",
            GapQuery::with_kind("what is the org's mission", GapKind::Semantic),
        );
        let step = InvestigationStep::from_gap(gap_id, &gap, None);
        match step.recommended_action {
            InvestigationAction::HybridSearch { semantic_weight, .. } => {
                assert_eq!(semantic_weight, 0.8);
            }
            other => panic!("expected HybridSearch, got {other:?}"),
        }
    }

    #[test]
    fn test_from_gap_structural_with_hints_fetches_urls() {
        let gap_id = Uuid::new_v4();
        let gap = MissingField::from_query(
            "volunteer page",
            GapQuery::with_kind("missing volunteer section", GapKind::Structural)
                .with_hints(["https://example.org/volunteer"]),
        );
        let step = InvestigationStep::from_gap(gap_id, &gap, None);
        match step.recommended_action {
            InvestigationAction::FetchUrls { urls } => {
                assert_eq!(urls, vec!["https://example.org/volunteer".to_string()]);
            }
            other => panic!("expected FetchUrls, got {other:?}"),
        }
    }

    #[test]
    fn test_from_gap_structural_without_hints_crawls_site() {
        let gap_id = Uuid::new_v4();
        let gap = MissingField::from_query(
            "volunteer page",
            GapQuery::with_kind("missing volunteer section", GapKind::Structural),
        );
        let step = InvestigationStep::from_gap(gap_id, &gap, Some("https://example.org"));
        match step.recommended_action {
            InvestigationAction::CrawlSite {
                root, max_depth, ..
            } => {
                assert_eq!(root, "https://example.org");
                assert_eq!(max_depth, 1);
            }
            other => panic!("expected CrawlSite, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_filtering() {
        let gap1 = Uuid::new_v4();
        let gap2 = Uuid::new_v4();

        let plan = InvestigationPlan::new()
            .with_step(InvestigationStep::new(
                gap1,
                "email",
                "email query",
                InvestigationAction::entity_search("email"),
            ))
            .with_step(InvestigationStep::new(
                gap2,
                "services",
                "services query",
                InvestigationAction::semantic_search("services"),
            ))
            .with_step(InvestigationStep::new(
                gap1,
                "email",
                "email query 2",
                InvestigationAction::fetch_url("http://contact.example.com"),
            ));

        assert_eq!(plan.len(), 3);
        assert_eq!(plan.steps_for_gap(gap1).count(), 2);
        assert_eq!(plan.steps_by_action("hybrid_search").count(), 2);
        assert_eq!(plan.steps_by_action("fetch_urls").count(), 1);
    }

    #[test]
    fn test_step_result() {
        let step = InvestigationStep::new(
            Uuid::new_v4(),
            "test",
            "test query",
            InvestigationAction::hybrid_search("test"),
        );

        let success = StepResult::success(
            step.clone(),
            vec!["http://a.com".to_string()],
            Vec::new(),
        )
        .with_duration(50)
        .with_tokens(100);

        assert!(success.is_success());
        assert!(success.has_content());
        assert_eq!(success.duration_ms, Some(50));

        let failure = StepResult::failure(step, "Connection timeout");
        assert!(!failure.is_success());
        assert!(!failure.has_content());
    }
}
