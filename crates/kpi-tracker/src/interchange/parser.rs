use super::columns::SheetRow;
use std::io::Read;

/// Read every data row, addressing cells by header name.
///
/// Missing columns stay empty and extra columns are ignored. Cells that are
/// not valid UTF-8 are decoded lossily instead of failing the file.
pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<SheetRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .byte_headers()?
        .iter()
        .map(|header| normalize_header(&String::from_utf8_lossy(header)))
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.byte_records() {
        let record = record?;
        let mut row = SheetRow::default();
        for (header, cell) in headers.iter().zip(record.iter()) {
            if let Some(slot) = row.cell_mut(header) {
                *slot = String::from_utf8_lossy(cell).into_owned();
            }
        }
        rows.push(row);
    }

    Ok(rows)
}

fn normalize_header(value: &str) -> String {
    value.replace('\u{feff}', "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn rows_are_read_by_header_name() {
        let rows = parse_rows(Cursor::new(
            "Pernyataan,Bahagian,Lain\n\"Program\nbaru\",BKP,abaikan\n",
        ))
        .expect("parse");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].department, "BKP");
        assert_eq!(rows[0].statement, "Program\nbaru");
        assert_eq!(rows[0].method, "");
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let mut bytes = b"\xef\xbb\xbfBahagian,Pernyataan\nBKP,Caf".to_vec();
        bytes.extend_from_slice(&[0xe9, b'\n']);
        let rows = parse_rows(Cursor::new(bytes)).expect("parse");
        assert_eq!(rows[0].department, "BKP");
        assert_eq!(rows[0].statement, "Caf\u{fffd}");
    }
}
