//! Core extraction types - the output of the extraction pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// The result of an extraction operation.
///
/// Contains the extracted content as markdown, along with metadata about
/// sources, gaps, grounding quality, and any detected conflicts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    /// The extracted content as markdown
    pub content: String,

    /// Pages that contributed to this extraction
    pub sources: Vec<Source>,

    /// Machine-readable queries for missing info.
    ///
    /// Each gap carries a structured query that can be piped directly to
    /// `search_for_gap()`, `WebSearcher::search()`, or `plan_investigation()`
    /// without reformulation.
    pub gaps: Vec<MissingField>,

    /// How well-grounded is this extraction?
    ///
    /// Replaces arbitrary confidence floats with meaningful categories.
    pub grounding: GroundingGrade,

    /// Contradictions detected across sources.
    ///
    /// The library doesn't resolve conflicts - it exposes them for
    /// application-level resolution.
    pub conflicts: Vec<Conflict>,

    /// Overall status of the extraction.
    ///
    /// Indicates whether the requested information was found, is missing,
    /// or has contradictory data across sources.
    pub status: ExtractionStatus,
}

/// Overall status of an extraction.
///
/// This tells the application at a glance whether the extraction succeeded
/// and what kind of follow-up might be needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ExtractionStatus {
    /// The requested information was found in the sources.
    #[default]
    Found,

    /// The requested information is partially available.
    ///
    /// Some fields were extracted, but gaps remain.
    Partial,

    /// The requested information was not found.
    ///
    /// Check `gaps` for details on what's missing and why.
    Missing,

    /// Sources contain contradictory information.
    ///
    /// Check `conflicts` for the specific contradictions.
    Contradictory,
}

impl Extraction {
    /// Create a new extraction with the given content.
    pub fn new(content: String) -> Self {
        Self {
            content,
            sources: Vec::new(),
            gaps: Vec::new(),
            grounding: GroundingGrade::SingleSource,
            conflicts: Vec::new(),
            status: ExtractionStatus::Found,
        }
    }

    /// Create an extraction representing "not found".
    pub fn not_found(gaps: Vec<MissingField>) -> Self {
        Self {
            content: String::new(),
            sources: Vec::new(),
            gaps,
            grounding: GroundingGrade::SingleSource,
            conflicts: Vec::new(),
            status: ExtractionStatus::Missing,
        }
    }

    /// Calculate the extraction status from the current state.
    pub fn calculate_status(&self) -> ExtractionStatus {
        if !self.conflicts.is_empty() {
            return ExtractionStatus::Contradictory;
        }
        if self.content.is_empty() && !self.gaps.is_empty() {
            return ExtractionStatus::Missing;
        }
        if !self.gaps.is_empty() {
            return ExtractionStatus::Partial;
        }
        ExtractionStatus::Found
    }

    /// Update the status based on current state.
    pub fn update_status(&mut self) {
        self.status = self.calculate_status();
    }

    /// Check if extraction needs enrichment (has gaps or is missing).
    pub fn needs_enrichment(&self) -> bool {
        matches!(
            self.status,
            ExtractionStatus::Missing | ExtractionStatus::Partial
        )
    }

    /// Calculate the grounding grade from source analysis (§4.7).
    ///
    /// `Verified` requires at least two distinct sources and no conflict;
    /// `Inferred` wins over `SingleSource` since an unattributed claim is
    /// worse than a thin one.
    pub fn calculate_grounding(
        sources: &[Source],
        conflicts: &[Conflict],
        has_inference: bool,
    ) -> GroundingGrade {
        if !conflicts.is_empty() {
            return GroundingGrade::Conflicted;
        }
        if has_inference {
            return GroundingGrade::Inferred;
        }
        if sources.len() >= 2 {
            return GroundingGrade::Verified;
        }
        GroundingGrade::SingleSource
    }

    /// Check if this extraction has any gaps.
    pub fn has_gaps(&self) -> bool {
        !self.gaps.is_empty()
    }

    /// Check if this extraction has conflicts.
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Check if the extraction is well-grounded (Verified or SingleSource).
    pub fn is_well_grounded(&self) -> bool {
        matches!(
            self.grounding,
            GroundingGrade::Verified | GroundingGrade::SingleSource
        )
    }

    /// Merge another extraction into this one.
    ///
    /// This is the "Synthesis" step in the Detective loop where new information
    /// from gap resolution gets combined with existing knowledge.
    ///
    /// - **Content**: Appends new content with a separator
    /// - **Sources**: Adds new sources, deduplicating by URL
    /// - **Gaps**: Union, deduplicated by `field` (testable property #8)
    /// - **Grounding**: Recalculated based on combined sources
    /// - **Conflicts**: Merged, deduplicated by `claim`
    pub fn merge(&mut self, other: Extraction) {
        let existing_urls: HashSet<String> = self.sources.iter().map(|s| s.url.clone()).collect();

        let has_primary_or_supporting = self
            .sources
            .iter()
            .any(|s| s.role == SourceRole::Primary || s.role == SourceRole::Supporting);

        if !other.content.is_empty() {
            if !self.content.is_empty() {
                self.content.push_str("\n\n---\n\n");
            }
            self.content.push_str(&other.content);
        }

        for source in other.sources {
            if !existing_urls.contains(&source.url) {
                let upgraded_source = if has_primary_or_supporting {
                    Source {
                        role: SourceRole::Corroborating,
                        ..source
                    }
                } else {
                    source
                };
                self.sources.push(upgraded_source);
            }
        }

        // A gap is resolved once a source now covers a URL that the gap's
        // hints pointed at, or simply when the merged-in extraction has no
        // matching gap of its own (the caller decided it's answered).
        let other_fields: HashSet<String> = other
            .gaps
            .iter()
            .map(|g| g.field.to_lowercase())
            .collect();
        self.gaps
            .retain(|g| other_fields.is_empty() || other_fields.contains(&g.field.to_lowercase()));

        for gap in other.gaps {
            if !self
                .gaps
                .iter()
                .any(|g| g.field.eq_ignore_ascii_case(&gap.field))
            {
                self.gaps.push(gap);
            }
        }

        let existing_claims: HashSet<String> =
            self.conflicts.iter().map(|c| c.claim.clone()).collect();
        for conflict in other.conflicts {
            if !existing_claims.contains(&conflict.claim) {
                self.conflicts.push(conflict);
            }
        }

        let has_inference = self.grounding == GroundingGrade::Inferred;
        self.grounding = Self::calculate_grounding(&self.sources, &self.conflicts, has_inference);

        self.update_status();
    }

    /// Merge multiple extractions.
    pub fn merge_all(&mut self, others: impl IntoIterator<Item = Extraction>) {
        for other in others {
            self.merge(other);
        }
    }

    /// Create a combined extraction from multiple extractions.
    pub fn combine(extractions: impl IntoIterator<Item = Extraction>) -> Self {
        let mut iter = extractions.into_iter();
        let mut combined = iter
            .next()
            .unwrap_or_else(|| Extraction::new(String::new()));
        combined.merge_all(iter);
        combined
    }

    /// Get the URLs of all sources.
    pub fn source_urls(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.url.as_str()).collect()
    }

    /// Get the count of sources by role.
    pub fn source_count_by_role(&self, role: SourceRole) -> usize {
        self.sources.iter().filter(|s| s.role == role).count()
    }
}

/// How well-grounded is an extraction?
///
/// This replaces arbitrary confidence floats (0.73 vs 0.71 is meaningless)
/// with meaningful categories that tell the application what to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroundingGrade {
    /// Multiple independent sources agree.
    ///
    /// This is the highest quality - cross-referenced information.
    Verified,

    /// Only one page mentioned it.
    ///
    /// Accurate but not cross-referenced. Application may want to
    /// verify important facts.
    SingleSource,

    /// Sources disagree (see conflicts field).
    ///
    /// Application should check the `conflicts` field and decide
    /// how to handle the contradiction.
    Conflicted,

    /// Not explicitly stated, LLM inferred.
    ///
    /// WARNING: This is often hallucination. Application should treat
    /// with skepticism or discard in strict mode.
    Inferred,
}

impl Default for GroundingGrade {
    fn default() -> Self {
        Self::SingleSource
    }
}

/// A source page that contributed to an extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    /// URL of the source page
    pub url: String,

    /// Page title if available
    pub title: Option<String>,

    /// When the page was fetched
    pub fetched_at: DateTime<Utc>,

    /// Role this source played in the extraction
    pub role: SourceRole,

    /// Application-provided metadata (pass-through)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Source {
    /// Create a new primary source.
    pub fn primary(url: String, fetched_at: DateTime<Utc>) -> Self {
        Self {
            url,
            title: None,
            fetched_at,
            role: SourceRole::Primary,
            metadata: HashMap::new(),
        }
    }

    /// Create a new supporting source.
    pub fn supporting(url: String, fetched_at: DateTime<Utc>) -> Self {
        Self {
            url,
            title: None,
            fetched_at,
            role: SourceRole::Supporting,
            metadata: HashMap::new(),
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Role a source played in the extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceRole {
    /// Primary source - main information came from here
    Primary,

    /// Supporting source - additional details
    Supporting,

    /// Corroborating source - confirms information from other sources
    Corroborating,
}

impl Default for SourceRole {
    fn default() -> Self {
        Self::Supporting
    }
}

/// Why a field is missing.
///
/// This helps the application decide whether to pursue external search
/// or accept that the information doesn't exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingReason {
    /// No sources mentioned this field at all.
    ///
    /// External search might find pages that have the answer.
    NotMentioned,

    /// Sources exist but disagree, or the value is redacted/hidden.
    ///
    /// Example: "Contact us for pricing" instead of actual prices, or
    /// conflicting values across sources.
    Ambiguous,

    /// The field was explicitly stated as not applicable, or the page
    /// that would carry it has been removed/replaced.
    ///
    /// Example: "We do not accept volunteers at this time."
    OutOfScope,
}

impl Default for MissingReason {
    fn default() -> Self {
        Self::NotMentioned
    }
}

/// Kind of gap, used to pick a Detective search strategy (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapKind {
    /// Specific named things: emails, phone numbers, names, dates.
    /// Best resolved with lexical-heavy search.
    Entity,

    /// Concepts, descriptions, relationships.
    /// Best resolved with semantic-heavy search.
    Semantic,

    /// Missing sections or pages entirely absent from the corpus.
    /// Best resolved by fetching or crawling new URLs.
    Structural,
}

impl Default for GapKind {
    fn default() -> Self {
        Self::Semantic
    }
}

impl GapKind {
    /// Classify a gap query heuristically from its text.
    pub fn classify(text: &str) -> Self {
        classify_gap_text(text)
    }

    /// Recommended semantic weight for a `HybridSearch` investigation step
    /// targeting a gap of this kind (§4.8).
    pub fn recommended_semantic_weight(&self) -> f32 {
        match self {
            GapKind::Entity => 0.3,
            GapKind::Semantic => 0.8,
            GapKind::Structural => 0.5,
        }
    }
}

/// A structured search query for a gap.
///
/// `text` is ready to pipe into `search_for_gap()` or `WebSearcher::search()`
/// without reformulation. `hints` carries optional concrete leads (URLs,
/// glob patterns) that the Detective can act on directly for structural
/// gaps instead of falling back to an open crawl.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GapQuery {
    /// Free-text search query.
    pub text: String,

    /// What kind of gap this is, driving Detective strategy selection.
    pub kind: GapKind,

    /// Optional concrete leads: candidate URLs or glob patterns.
    #[serde(default)]
    pub hints: Vec<String>,
}

impl GapQuery {
    /// Create a new gap query, classifying its kind heuristically from the text.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let kind = classify_gap_text(&text);
        Self {
            text,
            kind,
            hints: Vec::new(),
        }
    }

    /// Create a gap query with an explicit kind.
    pub fn with_kind(text: impl Into<String>, kind: GapKind) -> Self {
        Self {
            text: text.into(),
            kind,
            hints: Vec::new(),
        }
    }

    /// Attach hints (candidate URLs or glob patterns).
    pub fn with_hints(mut self, hints: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.hints = hints.into_iter().map(Into::into).collect();
        self
    }
}

/// Heuristic classification of free-text gap queries into a [`GapKind`].
///
/// Mirrors the Detective's own gap-type heuristics (`pipeline::index`) so a
/// `GapQuery` built directly by an `AI` provider still gets a sensible
/// default kind without a round-trip through the planner.
fn classify_gap_text(text: &str) -> GapKind {
    let lower = text.to_lowercase();

    if lower.contains("email")
        || lower.contains("phone")
        || lower.contains("address")
        || lower.contains("name of")
        || lower.contains("contact")
        || lower.contains('@')
        || lower.chars().any(|c| c.is_numeric())
    {
        return GapKind::Entity;
    }

    if lower.contains("section")
        || lower.contains("page")
        || lower.contains("missing")
        || lower.contains("incomplete")
    {
        return GapKind::Structural;
    }

    GapKind::Semantic
}

/// Machine-readable missing field for agent-driven refinement.
///
/// Each missing field contains:
/// - What's missing (`field`)
/// - A structured query to find it (`query`)
/// - Why it's missing (`reason`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingField {
    /// Human-readable field name (e.g., "contact email").
    pub field: String,

    /// Structured search query - pipe into `search_for_gap()`, a
    /// `WebSearcher`, or `plan_investigation()`.
    pub query: GapQuery,

    /// Why this field is missing.
    pub reason: MissingReason,
}

impl MissingField {
    /// Create a new missing field from free text, classifying the gap kind
    /// heuristically.
    pub fn new(field: impl Into<String>, query_text: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            query: GapQuery::new(query_text),
            reason: MissingReason::NotMentioned,
        }
    }

    /// Create from an already-structured [`GapQuery`].
    pub fn from_query(field: impl Into<String>, query: GapQuery) -> Self {
        Self {
            field: field.into(),
            query,
            reason: MissingReason::NotMentioned,
        }
    }

    /// Set a specific reason.
    pub fn with_reason(mut self, reason: MissingReason) -> Self {
        self.reason = reason;
        self
    }

    /// Create a "not mentioned" gap (default reason).
    pub fn not_mentioned(field: impl Into<String>, query_text: impl Into<String>) -> Self {
        Self::new(field, query_text).with_reason(MissingReason::NotMentioned)
    }

    /// Create an "ambiguous" gap (redacted value or conflicting sources).
    pub fn ambiguous(field: impl Into<String>, query_text: impl Into<String>) -> Self {
        Self::new(field, query_text).with_reason(MissingReason::Ambiguous)
    }

    /// Create an "out of scope" gap - not worth searching externally.
    pub fn out_of_scope(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            query: GapQuery::default(),
            reason: MissingReason::OutOfScope,
        }
    }

    /// Check if this gap is worth searching externally.
    pub fn is_searchable(&self) -> bool {
        matches!(self.reason, MissingReason::NotMentioned | MissingReason::Ambiguous)
    }
}

/// A detected conflict between sources.
///
/// The library doesn't resolve conflicts - it exposes them.
/// Application decides: "Trust /calendar over /volunteer" or "Flag for human review".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    /// The claim under dispute (e.g., "Company founded in 1999").
    pub claim: String,

    /// URLs of sources that support this claim.
    pub supporting_urls: Vec<String>,

    /// URLs of sources that contradict this claim.
    pub contradicting_urls: Vec<String>,
}

impl Conflict {
    /// Create a new conflict over a claim.
    pub fn new(claim: impl Into<String>) -> Self {
        Self {
            claim: claim.into(),
            supporting_urls: Vec::new(),
            contradicting_urls: Vec::new(),
        }
    }

    /// Add a supporting URL.
    pub fn with_supporting(mut self, url: impl Into<String>) -> Self {
        self.supporting_urls.push(url.into());
        self
    }

    /// Add a contradicting URL.
    pub fn with_contradicting(mut self, url: impl Into<String>) -> Self {
        self.contradicting_urls.push(url.into());
        self
    }
}
