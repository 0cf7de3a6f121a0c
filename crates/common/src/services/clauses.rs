//! Knowledge base clause retrieval
//!
//! Keyword filtering is a case-insensitive substring match over title OR
//! body. There is no ranking: clauses keep the store's title order.

use super::LegalServices;
use crate::db::models::{ClauseCategory, KnowledgeBaseClause};
use crate::errors::Result;
use crate::metrics;
use serde::Serialize;
use tracing::debug;

/// Concatenated clause text and how many clauses went into it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetrievedClauses {
    pub text: String,
    pub count: usize,
}

impl RetrievedClauses {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Clauses whose title or body contains `keyword` verbatim, ignoring case.
/// A missing or empty keyword keeps all; whitespace is part of the keyword.
pub fn select_clauses<'a>(
    clauses: &'a [KnowledgeBaseClause],
    keyword: Option<&str>,
) -> Vec<&'a KnowledgeBaseClause> {
    let needle = keyword.filter(|k| !k.is_empty()).map(str::to_lowercase);

    match needle {
        None => clauses.iter().collect(),
        Some(needle) => clauses
            .iter()
            .filter(|c| {
                c.title.to_lowercase().contains(&needle)
                    || c.text_content.to_lowercase().contains(&needle)
            })
            .collect(),
    }
}

/// `## {title}\n{text}` blocks separated by a blank line
pub fn render_clauses(clauses: &[&KnowledgeBaseClause]) -> String {
    clauses
        .iter()
        .map(|c| format!("## {}\n{}", c.title, c.text_content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

impl LegalServices {
    /// Verified clauses of `category` matching `keyword`
    pub async fn retrieve_clauses(
        &self,
        category: ClauseCategory,
        keyword: Option<&str>,
    ) -> Result<RetrievedClauses> {
        let verified = self.store.verified_clauses(category).await?;
        let selected = select_clauses(&verified, keyword);

        let retrieved = RetrievedClauses {
            text: render_clauses(&selected),
            count: selected.len(),
        };

        metrics::record_clause_retrieval(category.as_str(), retrieved.count);
        debug!(
            clause_type = %category,
            keyword = keyword.unwrap_or(""),
            count = retrieved.count,
            "Clauses retrieved"
        );

        Ok(retrieved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn clause(title: &str, text: &str) -> KnowledgeBaseClause {
        KnowledgeBaseClause {
            id: Uuid::new_v4(),
            title: title.to_string(),
            clause_type: "REN".to_string(),
            text_content: text.to_string(),
            is_verified: true,
        }
    }

    #[test]
    fn test_empty_keyword_keeps_everything() {
        let clauses = vec![clause("Rent", "Pay"), clause("Deposit", "Hold")];
        assert_eq!(select_clauses(&clauses, None).len(), 2);
        assert_eq!(select_clauses(&clauses, Some("")).len(), 2);
    }

    #[test]
    fn test_whitespace_is_part_of_the_keyword() {
        let clauses = vec![clause("Rent Payment", "Monthly.")];
        assert!(select_clauses(&clauses, Some(" rent")).is_empty());
        assert!(select_clauses(&clauses, Some("   ")).is_empty());
        assert_eq!(select_clauses(&clauses, Some("rent payment")).len(), 1);
    }

    #[test]
    fn test_keyword_matches_title_or_body_case_insensitively() {
        let clauses = vec![
            clause("Rent Payment", "Monthly in advance."),
            clause("Deposit", "Refundable after the RENTAL ends."),
            clause("Pets", "Not allowed."),
        ];

        let titles: Vec<&str> = select_clauses(&clauses, Some("rent"))
            .into_iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Rent Payment", "Deposit"]);

        assert!(select_clauses(&clauses, Some("garden")).is_empty());
    }

    #[test]
    fn test_render_format() {
        let clauses = vec![clause("A", "first"), clause("B", "second")];
        let refs: Vec<&KnowledgeBaseClause> = clauses.iter().collect();
        assert_eq!(render_clauses(&refs), "## A\nfirst\n\n## B\nsecond");
        assert_eq!(render_clauses(&[]), "");
    }
}
