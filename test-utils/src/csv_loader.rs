use std::error::Error;
use std::path::{Path, PathBuf};

use csv::Reader;

use common::RawTrigger;

/// Recorded drops shipped with the workspace
pub const DROP_TRIGGERS_CSV: &str = "drop_triggers.csv";

const DROP_COLUMN: usize = 0;
const RAW_MICROS_COLUMN: usize = 1;

/// Absolute path of a file under `test-utils/test_data`, independent of the directory the
/// tests run from.
pub fn test_data_path(file_name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("test_data")
        .join(file_name)
}

/// Loads recorded drops as one trigger list per drop, in file order.
///
/// Each row holds a drop index and a raw device timestamp. Rows of the same drop must be
/// contiguous.
pub fn load_drops<P: AsRef<Path>>(file_path: P) -> Result<Vec<Vec<RawTrigger>>, Box<dyn Error>> {
    let mut rdr = Reader::from_path(file_path)?;
    let mut drops: Vec<(u64, Vec<RawTrigger>)> = Vec::new();

    for result in rdr.records() {
        let record = result?;
        let field = |column: usize| {
            record
                .get(column)
                .ok_or_else(|| format!("Column index {} out of bounds", column))
        };
        let drop: u64 = field(DROP_COLUMN)?.trim().parse()?;
        let trigger: RawTrigger = field(RAW_MICROS_COLUMN)?
            .parse()
            .map_err(|e| format!("Invalid trigger: {}", e))?;

        match drops.last_mut() {
            Some((id, triggers)) if *id == drop => triggers.push(trigger),
            _ => {
                if drops.iter().any(|(id, _)| *id == drop) {
                    return Err(format!("Rows of drop {} are not contiguous", drop).into());
                }
                drops.push((drop, vec![trigger]));
            }
        }
    }

    Ok(drops.into_iter().map(|(_, triggers)| triggers).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "No such file or directory")]
    fn test_read_inexistent_csv() {
        let _ = load_drops(test_data_path("drop_triggerss.csv")).unwrap();
    }

    #[test]
    fn test_load_drops() {
        let drops = load_drops(test_data_path(DROP_TRIGGERS_CSV)).unwrap();
        assert_eq!(drops.len(), 4);
        assert_eq!(drops[0].len(), 10);
        assert_eq!(drops[0][0], RawTrigger::new(3_000_000));
        assert_eq!(drops[3].len(), 2);
        for triggers in drops {
            assert!(triggers.windows(2).all(|w| w[1] > w[0]));
        }
    }
}
