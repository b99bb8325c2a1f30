use crate::domain::{ChecklistDocument, Os};

/// The fixed header row of a checklist export.
const HEADER: &str = "OS,Task ID,Item,Description,Automated";

/// Flattens a checklist document into CSV.
///
/// One row per item, for every product in stored order, each in the fixed
/// OS order Windows then Linux. The automated flag renders as `Yes`/`No`;
/// missing task IDs and descriptions render as empty fields.
#[must_use]
pub fn export_csv(document: &ChecklistDocument) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');

    for (_, product) in document.products() {
        for os in Os::ALL {
            for entry in product.bucket(os).entries() {
                let row = [
                    os.name(),
                    entry.task_id,
                    entry.name,
                    entry.description,
                    if entry.automated { "Yes" } else { "No" },
                ];
                let fields: Vec<String> = row.iter().map(|field| csv_escape(field)).collect();
                out.push_str(&fields.join(","));
                out.push('\n');
            }
        }
    }

    out
}

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChecklistDocument;

    #[test]
    fn empty_document_exports_header_only() {
        let document = ChecklistDocument::skeleton("CI");
        assert_eq!(export_csv(&document), "OS,Task ID,Item,Description,Automated\n");
    }

    #[test]
    fn rows_preserve_item_order_and_render_flags() {
        let mut document = ChecklistDocument::skeleton("CI");
        let bucket = document.ensure_product("CI").bucket_mut(Os::Windows);
        bucket.add_item("Step1", "T-1", "", true).unwrap();
        bucket.add_item("Step2", "", "1. Do X", false).unwrap();

        let csv = export_csv(&document);
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines[0], "OS,Task ID,Item,Description,Automated");
        assert_eq!(lines[1], "Windows,T-1,Step1,,Yes");
        assert_eq!(lines[2], "Windows,,Step2,1. Do X,No");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn windows_rows_precede_linux_rows() {
        let mut document = ChecklistDocument::skeleton("CI");
        let product = document.ensure_product("CI");
        product
            .bucket_mut(Os::Linux)
            .add_item("Package", "", "", false)
            .unwrap();
        product
            .bucket_mut(Os::Windows)
            .add_item("Build", "", "", false)
            .unwrap();

        let csv = export_csv(&document);
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines[1], "Windows,,Build,,No");
        assert_eq!(lines[2], "Linux,,Package,,No");
    }

    #[test]
    fn fields_with_delimiters_are_quoted() {
        let mut document = ChecklistDocument::skeleton("CI");
        document
            .ensure_product("CI")
            .bucket_mut(Os::Windows)
            .add_item("Build, sign", "T-1", "says \"done\"", false)
            .unwrap();

        let csv = export_csv(&document);
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines[1], "Windows,T-1,\"Build, sign\",\"says \"\"done\"\"\",No");
    }

    #[test]
    fn exports_every_product() {
        let mut document = ChecklistDocument::default();
        document
            .ensure_product("CI")
            .bucket_mut(Os::Windows)
            .add_item("Build", "", "", false)
            .unwrap();
        document
            .ensure_product("Server")
            .bucket_mut(Os::Linux)
            .add_item("Deploy", "", "", true)
            .unwrap();

        let csv = export_csv(&document);
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines[1], "Windows,,Build,,No");
        assert_eq!(lines[2], "Linux,,Deploy,,Yes");
    }
}
