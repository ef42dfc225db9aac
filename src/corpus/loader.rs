use crate::corpus::{Corpus, Recipe};
use crate::error::{Error, Result};
use std::path::Path;
use tracing::{debug, info};

/// Columns the corpus CSV must carry, in any order.
const REQUIRED_COLUMNS: &[&str] = &["name", "ingredients", "directions", "diet_type"];

/// Load the recipe corpus from a CSV file.
///
/// Rows deserialize by header name; missing numeric cells become `None`
/// rather than failing the row. A row that cannot be decoded at all fails
/// the load with its line number.
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Corpus> {
    let path = path.as_ref();
    debug!("Loading corpus from {}", path.display());

    let mut reader = csv::Reader::from_path(path).map_err(|e| {
        Error::Corpus(format!("Failed to open {}: {e}", path.display()))
    })?;

    let headers = reader.headers()?.clone();

    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == *column) {
            return Err(Error::Corpus(format!(
                "Missing required column '{column}' (found: {:?})",
                headers.iter().collect::<Vec<_>>()
            )));
        }
    }

    let mut records = Vec::new();
    for (row, result) in reader.deserialize::<Recipe>().enumerate() {
        // Line 1 is the header
        let recipe = result.map_err(|e| {
            Error::Corpus(format!("Failed to decode row at line {}: {e}", row + 2))
        })?;
        records.push(recipe);
    }

    if records.is_empty() {
        return Err(Error::Corpus(format!(
            "Corpus {} contains no recipes",
            path.display()
        )));
    }

    info!("Loaded {} recipes from {}", records.len(), path.display());
    Ok(Corpus::new(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_CSV: &str = "\
name,ingredients,directions,prep,cook,servings,calories,protein_g,carbohydrates_g,fat_g,diet_type,url
Lentil Soup,\"['1 cup lentils', '2 carrots']\",Simmer until soft.,10 mins,30 mins,4,320,18,40,6,Vegan,https://example.com/lentil-soup
Omelette,\"eggs, butter, chives\",Whisk and fry.,5 mins,5 mins,1,250,14,2,,Vegetarian,https://example.com/omelette
";

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write temp CSV");
        file
    }

    #[test]
    fn test_load_corpus() {
        let file = write_csv(SAMPLE_CSV);
        let corpus = load_corpus(file.path()).expect("Failed to load corpus");

        assert_eq!(corpus.len(), 2);

        let soup = corpus.get(0).unwrap();
        assert_eq!(soup.name, "Lentil Soup");
        assert_eq!(soup.calories, Some(320.0));
        assert_eq!(soup.diet_type.as_deref(), Some("Vegan"));

        // Empty numeric cell decodes as None
        let omelette = corpus.get(1).unwrap();
        assert_eq!(omelette.fat_g, None);
    }

    #[test]
    fn test_missing_column_is_rejected() {
        let file = write_csv("name,ingredients\nSoup,lentils\n");
        let err = load_corpus(file.path()).unwrap_err();
        assert!(err.to_string().contains("directions"));
    }

    #[test]
    fn test_empty_corpus_is_rejected() {
        let file = write_csv(
            "name,ingredients,directions,prep,cook,servings,calories,protein_g,carbohydrates_g,fat_g,diet_type,url\n",
        );
        assert!(load_corpus(file.path()).is_err());
    }
}
