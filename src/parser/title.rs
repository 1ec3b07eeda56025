//! Task title extraction.

use once_cell::sync::Lazy;
use regex::Regex;

use super::temporal::clause_starts;

/// Title used when nothing is left after stripping.
pub const DEFAULT_TITLE: &str = "Nouvelle tâche";

static LEAD_IN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:rappelle[- ]moi|rappel|note|pense[- ]bête|ajoute|crée|nouvelle tâche)\s+(?:(?:de|à|pour)\b|d['’])?\s*",
    )
    .expect("valid lead-in regex")
});
static PRIORITY_CONJUNCTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*\bet\s*(?:urgent|important)e?\s*$").expect("valid conjunction regex")
});
static PRIORITY_QUALIFIER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*,?\s*(?:c['’]est|très)?\s*(?:urgent|important|crucial|prioritaire)e?")
        .expect("valid qualifier regex")
});

/// Derive a task title from a transcript. Never returns an empty string.
pub fn extract_title(text: &str) -> String {
    let title = LEAD_IN_RE.replace(text, "");
    let title = strip_date_clauses(&title);
    let title = PRIORITY_CONJUNCTION_RE.replace(title, "");
    let title = PRIORITY_QUALIFIER_RE.replace_all(&title, "");

    let title = capitalize_first(title.trim());
    if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title
    }
}

/// Cut at the first date clause that follows whitespace; the clause and the
/// rest of the text go.
fn strip_date_clauses(text: &str) -> &str {
    clause_starts(text)
        .into_iter()
        .find(|&start| text[..start].ends_with(char::is_whitespace))
        .map(|start| text[..start].trim_end())
        .unwrap_or(text)
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_lead_in_and_connector() {
        assert_eq!(extract_title("rappelle-moi d'appeler le garagiste"), "Appeler le garagiste");
        assert_eq!(extract_title("Rappelle moi de sortir les poubelles"), "Sortir les poubelles");
        assert_eq!(extract_title("ajoute acheter du lait"), "Acheter du lait");
        assert_eq!(extract_title("pense-bête pour la réunion"), "La réunion");
        assert_eq!(extract_title("nouvelle tâche ranger le garage"), "Ranger le garage");
    }

    #[test]
    fn connector_must_be_a_whole_word() {
        // "demain" starts with "de" but is not a connector.
        assert_eq!(extract_title("note demain matin"), "Demain matin");
        assert_eq!(extract_title("ajoute pourboire au resto"), "Pourboire au resto");
    }

    #[test]
    fn lead_in_needs_following_whitespace() {
        assert_eq!(extract_title("rappeler Paul"), "Rappeler Paul");
        assert_eq!(extract_title("notes de cours"), "Notes de cours");
    }

    #[test]
    fn strips_trailing_date_clauses() {
        assert_eq!(extract_title("acheter du pain demain matin"), "Acheter du pain");
        assert_eq!(extract_title("appeler maman dans 10 minutes"), "Appeler maman");
        assert_eq!(extract_title("réunion à 14h30 en salle B"), "Réunion");
        assert_eq!(extract_title("réunion à 9 heures"), "Réunion");
        assert_eq!(extract_title("dentiste lundi prochain"), "Dentiste");
        assert_eq!(extract_title("payer les impôts pour le 15 mai 2027"), "Payer les impôts");
        assert_eq!(extract_title("payer les impôts le 15 mai"), "Payer les impôts");
    }

    #[test]
    fn earliest_clause_wins() {
        assert_eq!(
            extract_title("rappelle-moi d'arroser les plantes vendredi à 18h"),
            "Arroser les plantes"
        );
        assert_eq!(
            extract_title("envoyer le rapport dans 3 jours à 14h30"),
            "Envoyer le rapport"
        );
    }

    #[test]
    fn clause_at_the_very_start_is_kept() {
        assert_eq!(extract_title("demain appeler Paul"), "Demain appeler Paul");
        assert_eq!(extract_title("demain appeler Paul vendredi"), "Demain appeler Paul");
    }

    #[test]
    fn non_clock_numbers_are_kept() {
        assert_eq!(extract_title("réserver une table à 4 personnes"), "Réserver une table à 4 personnes");
    }

    #[test]
    fn strips_priority_vocabulary() {
        assert_eq!(extract_title("payer la facture, c'est urgent"), "Payer la facture");
        assert_eq!(extract_title("payer la facture très importante"), "Payer la facture");
        assert_eq!(extract_title("dossier crucial à rendre"), "Dossier à rendre");
        assert_eq!(
            extract_title("appeler le médecin, c'est urgent et important"),
            "Appeler le médecin"
        );
    }

    #[test]
    fn capitalizes_accented_first_letter() {
        assert_eq!(extract_title("éplucher les légumes"), "Éplucher les légumes");
    }

    #[test]
    fn falls_back_to_placeholder() {
        assert_eq!(extract_title(""), DEFAULT_TITLE);
        assert_eq!(extract_title("   "), DEFAULT_TITLE);
        assert_eq!(extract_title("rappelle-moi urgent"), DEFAULT_TITLE);
        assert_eq!(extract_title("c'est important"), DEFAULT_TITLE);
    }

    #[test]
    fn plain_text_is_trimmed_and_capitalized() {
        assert_eq!(extract_title("  arroser les tomates  "), "Arroser les tomates");
    }
}
