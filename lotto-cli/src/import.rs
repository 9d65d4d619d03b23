use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::ValueEnum;
use serde::Deserialize;

use lotto_db::db::{insert_draw, touch_last_updated};
use lotto_db::models::DrawRecord;
use lotto_db::rusqlite::Connection;

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq)]
pub enum ImportFormat {
    #[default]
    Auto,
    Json,
    Csv,
}

impl ImportFormat {
    fn resolve(self, path: &Path) -> Result<ImportFormat> {
        if self != ImportFormat::Auto {
            return Ok(self);
        }
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_lowercase()) {
            Some(ext) if ext == "json" => Ok(ImportFormat::Json),
            Some(ext) if ext == "csv" => Ok(ImportFormat::Csv),
            _ => bail!("Format indéterminé pour {:?}, précisez --format json|csv", path),
        }
    }
}

/// Réponse de l'API officielle pour un tirage.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiDraw {
    return_value: String,
    drw_no: Option<u32>,
    drw_no_date: Option<String>,
    drwt_no1: Option<u8>,
    drwt_no2: Option<u8>,
    drwt_no3: Option<u8>,
    drwt_no4: Option<u8>,
    drwt_no5: Option<u8>,
    drwt_no6: Option<u8>,
    bnus_no: Option<u8>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiPayload {
    Many(Vec<ApiDraw>),
    One(ApiDraw),
}

/// `None` pour un tirage pas encore effectué.
fn parse_api_draw(raw: &ApiDraw) -> Result<Option<DrawRecord>> {
    if raw.return_value != "success" {
        return Ok(None);
    }

    let round = raw.drw_no.context("Champ drwNo manquant")?;
    let field = |value: Option<u8>, name: &str| -> Result<u8> {
        value.with_context(|| format!("Champ {} manquant (tirage {})", name, round))
    };
    let numbers = [
        field(raw.drwt_no1, "drwtNo1")?,
        field(raw.drwt_no2, "drwtNo2")?,
        field(raw.drwt_no3, "drwtNo3")?,
        field(raw.drwt_no4, "drwtNo4")?,
        field(raw.drwt_no5, "drwtNo5")?,
        field(raw.drwt_no6, "drwtNo6")?,
    ];
    let draw_date = raw.drw_no_date.clone().unwrap_or_default();

    DrawRecord::new(round, numbers, raw.bnus_no, draw_date).map(Some)
}

fn parse_record(record: &csv::StringRecord) -> Result<DrawRecord> {
    let get = |idx: usize| -> Result<String> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .with_context(|| format!("Champ manquant à l'index {}", idx))
    };

    let get_u8 = |idx: usize| -> Result<u8> {
        let s = get(idx)?;
        s.parse::<u8>()
            .with_context(|| format!("Impossible de parser '{}' (index {})", s, idx))
    };

    let round_str = get(0)?;
    let round: u32 = round_str
        .parse()
        .with_context(|| format!("Numéro de tirage invalide : '{}'", round_str))?;
    let draw_date = parse_date(&get(1)?)?;

    let numbers = [
        get_u8(2)?,
        get_u8(3)?,
        get_u8(4)?,
        get_u8(5)?,
        get_u8(6)?,
        get_u8(7)?,
    ];

    let bonus_str = get(8).unwrap_or_default();
    let bonus = if bonus_str.is_empty() {
        None
    } else {
        Some(get_u8(8)?)
    };

    DrawRecord::new(round, numbers, bonus, draw_date)
}

/// Accepte `AAAA-MM-JJ` tel quel et convertit `JJ/MM/AAAA`.
pub fn parse_date(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.contains('-') {
        return Ok(raw.to_string());
    }
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() != 3 {
        bail!("Format de date invalide: '{}'", raw);
    }
    Ok(format!("{}-{}-{}", parts[2], parts[1], parts[0]))
}

#[derive(Debug, Default, PartialEq)]
pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub not_drawn: u32,
    pub errors: u32,
}

impl ImportResult {
    fn record(&mut self, conn: &Connection, draw: Result<Option<DrawRecord>>) {
        match draw {
            Ok(Some(draw)) => match insert_draw(conn, &draw) {
                Ok(true) => self.inserted += 1,
                Ok(false) => self.skipped += 1,
                Err(e) => {
                    log::warn!("Erreur insertion tirage {}: {}", draw.round, e);
                    self.errors += 1;
                }
            },
            Ok(None) => self.not_drawn += 1,
            Err(e) => {
                log::warn!("Erreur parsing entrée {}: {}", self.total_records, e);
                self.errors += 1;
            }
        }
    }
}

pub fn import_file(conn: &Connection, path: &Path, format: ImportFormat) -> Result<ImportResult> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;
    let result = match format.resolve(path)? {
        ImportFormat::Csv => import_csv(conn, file)?,
        _ => {
            let mut json = String::new();
            std::io::BufReader::new(file)
                .read_to_string(&mut json)
                .with_context(|| format!("Impossible de lire {:?}", path))?;
            import_json(conn, &json)?
        }
    };
    log::info!(
        "Import {:?} : {} insérés, {} doublons, {} non tirés, {} erreurs",
        path, result.inserted, result.skipped, result.not_drawn, result.errors
    );
    Ok(result)
}

pub fn import_json(conn: &Connection, json: &str) -> Result<ImportResult> {
    let payload: ApiPayload = serde_json::from_str(json).context("JSON illisible")?;
    let entries = match payload {
        ApiPayload::Many(v) => v,
        ApiPayload::One(d) => vec![d],
    };

    let tx = conn.unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let mut result = ImportResult::default();
    for entry in &entries {
        result.total_records += 1;
        result.record(&tx, parse_api_draw(entry));
    }

    touch_last_updated(&tx, Utc::now())?;
    tx.commit().context("Échec du commit")?;
    Ok(result)
}

pub fn import_csv<R: Read>(conn: &Connection, reader: R) -> Result<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(reader);

    let tx = conn.unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let mut result = ImportResult::default();
    for record_result in reader.records() {
        result.total_records += 1;
        match record_result {
            Ok(record) => result.record(&tx, parse_record(&record).map(Some)),
            Err(e) => {
                log::warn!("Erreur lecture ligne {}: {}", result.total_records, e);
                result.errors += 1;
            }
        }
    }

    touch_last_updated(&tx, Utc::now())?;
    tx.commit().context("Échec du commit")?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotto_db::db::{count_draws, fetch_last_draws, last_updated, migrate};

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    const SINGLE: &str = r#"{
        "returnValue": "success", "drwNo": 1100, "drwNoDate": "2024-01-06",
        "drwtNo1": 17, "drwtNo2": 26, "drwtNo3": 29, "drwtNo4": 30, "drwtNo5": 31, "drwtNo6": 43,
        "bnusNo": 12, "totSellamnt": 114000000000, "firstWinamnt": 2580000000
    }"#;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("06/01/2024").unwrap(), "2024-01-06");
        assert_eq!(parse_date("2024-01-06").unwrap(), "2024-01-06");
        assert!(parse_date("2024.01.06").is_err());
    }

    #[test]
    fn test_format_resolution() {
        assert_eq!(ImportFormat::Auto.resolve(Path::new("a.JSON")).unwrap(), ImportFormat::Json);
        assert_eq!(ImportFormat::Auto.resolve(Path::new("a.csv")).unwrap(), ImportFormat::Csv);
        assert_eq!(ImportFormat::Csv.resolve(Path::new("a.txt")).unwrap(), ImportFormat::Csv);
        assert!(ImportFormat::Auto.resolve(Path::new("a.txt")).is_err());
    }

    #[test]
    fn test_import_single_json_object() {
        let conn = memory_db();
        let result = import_json(&conn, SINGLE).unwrap();
        assert_eq!(result.inserted, 1);

        let draws = fetch_last_draws(&conn, 1).unwrap();
        assert_eq!(draws[0].round, 1100);
        assert_eq!(draws[0].numbers, [17, 26, 29, 30, 31, 43]);
        assert_eq!(draws[0].bonus_number, Some(12));
        assert!(last_updated(&conn).unwrap().is_some());
    }

    #[test]
    fn test_import_json_array_skips_undrawn_and_sorts() {
        let conn = memory_db();
        let json = format!(
            r#"[{}, {{"returnValue": "fail"}},
               {{"returnValue": "success", "drwNo": 1099, "drwNoDate": "2023-12-30",
                 "drwtNo1": 45, "drwtNo2": 3, "drwtNo3": 20, "drwtNo4": 8, "drwtNo5": 33, "drwtNo6": 11,
                 "bnusNo": 1}},
               {{"returnValue": "success", "drwNo": 1098, "drwtNo1": 1}}]"#,
            SINGLE
        );
        let result = import_json(&conn, &json).unwrap();
        assert_eq!(
            result,
            ImportResult { total_records: 4, inserted: 2, skipped: 0, not_drawn: 1, errors: 1 }
        );

        let draws = fetch_last_draws(&conn, 10).unwrap();
        assert_eq!(draws[1].numbers, [3, 8, 11, 20, 33, 45]);
    }

    #[test]
    fn test_import_json_duplicates_skipped() {
        let conn = memory_db();
        import_json(&conn, SINGLE).unwrap();
        let result = import_json(&conn, SINGLE).unwrap();
        assert_eq!(result.skipped, 1);
        assert_eq!(count_draws(&conn).unwrap(), 1);
    }

    #[test]
    fn test_import_json_rejects_garbage() {
        let conn = memory_db();
        assert!(import_json(&conn, "pas du json").is_err());
    }

    #[test]
    fn test_import_csv() {
        let conn = memory_db();
        let csv = "round;date;n1;n2;n3;n4;n5;n6;bonus\n\
                   1100;06/01/2024;17;26;29;30;31;43;12\n\
                   1099;2023-12-30;3;8;11;20;33;45;\n\
                   1098;2023-12-23;1;1;2;3;4;5;6\n";
        let result = import_csv(&conn, csv.as_bytes()).unwrap();
        assert_eq!(result.total_records, 3);
        assert_eq!(result.inserted, 2);
        assert_eq!(result.errors, 1);

        let draws = fetch_last_draws(&conn, 10).unwrap();
        assert_eq!(draws[0].draw_date, "2024-01-06");
        assert_eq!(draws[1].bonus_number, None);
    }
}
