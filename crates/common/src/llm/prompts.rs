//! Instruction templates

use crate::db::models::ClauseCategory;

pub const ANALYSIS_SYSTEM_PROMPT: &str =
    "You are an expert legal analyst. Reply with a single JSON object and nothing else.";

pub const GENERATION_SYSTEM_PROMPT: &str =
    "You are a legal contract drafting system. Produce one final, safe contract.";

/// Marker lines delimiting embedded material. The simulated provider reads
/// the prompt back through them.
pub const SECTION_DELIMITER: &str = "---";
pub const CONTRACT_HEADER: &str = "Contract text to analyse:";
pub const DETAILS_HEADER: &str = "User request details:";
pub const CLAUSES_HEADER: &str = "Retrieved verified clauses:";
pub const CATEGORY_HEADER: &str = "Contract type:";

pub fn analysis_prompt(contract_text: &str) -> String {
    format!(
        "You are an expert legal advisor specialised in contract review. \
         Analyse the contract below and identify every loophole and legal risk \
         that could harm the first party. Respond in JSON only, with these keys:\n\
         1. \"summary\": a summary of the main risks and the overall assessment.\n\
         2. \"risks\": an array of risks, each with \"clause_text\", \"risk_description\" \
         and \"suggested_amendment\".\n\
         3. \"rating\": a risk rating from 1 to 5, where 5 is the highest.\n\n\
         {CONTRACT_HEADER}\n{SECTION_DELIMITER}\n{contract_text}\n{SECTION_DELIMITER}"
    )
}

pub fn generation_prompt(
    category: ClauseCategory,
    details: &serde_json::Value,
    clauses: &str,
) -> String {
    let details =
        serde_json::to_string_pretty(details).unwrap_or_else(|_| details.to_string());

    format!(
        "You are an expert and trustworthy legal contract generation system. \
         Draft a complete and safe contract from the user's request and the verified \
         clauses provided.\n\
         1. Use the verified clauses below as the core building blocks of the contract.\n\
         2. Fill the blanks in the clauses with the data the user provided.\n\
         3. Reply with the final contract as plain text.\n\n\
         {CATEGORY_HEADER} {}\n\n\
         {DETAILS_HEADER}\n{details}\n\n\
         {CLAUSES_HEADER}\n{SECTION_DELIMITER}\n{clauses}\n{SECTION_DELIMITER}",
        category.display_name()
    )
}

/// Text between `header` and the next closing delimiter
pub fn extract_section<'a>(prompt: &'a str, header: &str) -> Option<&'a str> {
    let start = prompt.find(header)? + header.len();
    let rest = prompt[start..].trim_start_matches([' ', '\n']);
    let rest = rest
        .strip_prefix(SECTION_DELIMITER)
        .map(|r| r.strip_prefix('\n').unwrap_or(r))
        .unwrap_or(rest);
    let end = rest
        .rfind(&format!("\n{SECTION_DELIMITER}"))
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Remainder of the line following `header`
pub fn extract_line<'a>(prompt: &'a str, header: &str) -> Option<&'a str> {
    let start = prompt.find(header)? + header.len();
    prompt[start..].lines().next().map(str::trim)
}
