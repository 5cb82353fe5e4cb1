//! Report rendering for stock data
//!
//! Renderers work only on the rows in the request. They never query the
//! database; filtering and reconciliation happen before rows get here.

use std::path::Path;

use genpdf::{
    elements::{self, Break, Paragraph, TableLayout},
    fonts::{FontData, FontFamily},
    render::Area,
    style::{Color, Style},
    Alignment, Context, Element, Mm, Position, RenderResult, Size,
};
use rust_xlsxwriter::{Format, Workbook};
use serde::Deserialize;
use serde_json::Value;
use shared::report::{
    cell_number, cell_text, clip_to_width, relabel_columns, remaining_stock_columns, rows_that_fit,
    stock_out_columns, store_in_columns, ColumnDef,
};

use crate::config::ReportConfig;
use crate::error::{AppError, AppResult};

/// Body of every report endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub rows: Vec<Value>,
    pub columns: Option<Vec<ColumnDef>>,
    pub department: Option<String>,
    pub title: Option<String>,
    pub scheme: Option<String>,
}

/// Which table a report shows when the caller sends no columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    RemainingStock,
    StoreIn,
    StockOut,
}

impl ReportKind {
    fn default_columns(&self) -> Vec<ColumnDef> {
        match self {
            ReportKind::RemainingStock => remaining_stock_columns(),
            ReportKind::StoreIn => store_in_columns(),
            ReportKind::StockOut => stock_out_columns(),
        }
    }

    fn default_title(&self) -> &'static str {
        match self {
            ReportKind::RemainingStock => "Stock Report",
            ReportKind::StoreIn => "Store-In Report",
            ReportKind::StockOut => "Stock-Out Report",
        }
    }

    fn file_stem(&self) -> &'static str {
        match self {
            ReportKind::RemainingStock => "stock_report",
            ReportKind::StoreIn => "storein_report",
            ReportKind::StockOut => "stockout_report",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Pdf,
    Xlsx,
}

impl ReportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "application/pdf",
            ReportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    pub fn file_name(&self, kind: ReportKind) -> String {
        match self {
            ReportFormat::Pdf => format!("{}.pdf", kind.file_stem()),
            ReportFormat::Xlsx => format!("{}.xlsx", kind.file_stem()),
        }
    }
}

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    config: ReportConfig,
}

fn report_error(e: impl std::fmt::Display) -> AppError {
    AppError::Report(e.to_string())
}

impl ReportingService {
    /// Create a new ReportingService instance
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Render the rows of `request` in the requested format
    pub fn render(
        &self,
        format: ReportFormat,
        kind: ReportKind,
        request: &ReportRequest,
    ) -> AppResult<Vec<u8>> {
        if request.rows.is_empty() {
            return Err(AppError::Validation {
                field: "rows".to_string(),
                message: "No rows to report".to_string(),
            });
        }

        let columns = match format {
            ReportFormat::Pdf => self.columns(kind, request),
            ReportFormat::Xlsx => match &request.columns {
                Some(columns) if !columns.is_empty() => {
                    relabel_columns(columns, request.department.as_deref())
                }
                _ => {
                    return Err(AppError::Validation {
                        field: "columns".to_string(),
                        message: "Spreadsheet export needs a column list".to_string(),
                    })
                }
            },
        };

        match format {
            ReportFormat::Pdf => self.render_pdf(kind, request, &columns),
            ReportFormat::Xlsx => self.render_xlsx(kind, request, &columns),
        }
    }

    /// Caller's columns if given, otherwise the default set, relabeled for
    /// the department
    fn columns(&self, kind: ReportKind, request: &ReportRequest) -> Vec<ColumnDef> {
        let columns = match &request.columns {
            Some(columns) if !columns.is_empty() => columns.clone(),
            _ => kind.default_columns(),
        };
        relabel_columns(&columns, request.department.as_deref())
    }

    // ========================================================================
    // Spreadsheet
    // ========================================================================

    fn render_xlsx(
        &self,
        kind: ReportKind,
        request: &ReportRequest,
        columns: &[ColumnDef],
    ) -> AppResult<Vec<u8>> {
        let col_count = u16::try_from(columns.len()).map_err(|_| AppError::Validation {
            field: "columns".to_string(),
            message: "Too many columns".to_string(),
        })?;

        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();

        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(kind.default_title())
            .map_err(report_error)?;

        for (col, column) in (0..col_count).zip(columns) {
            worksheet
                .write_string_with_format(0, col, column.header_name.as_str(), &header_format)
                .map_err(report_error)?;
            worksheet
                .set_column_width(col, column.header_name.len().max(12) as f64)
                .map_err(report_error)?;
        }

        for (row_index, row) in request.rows.iter().enumerate() {
            let xlsx_row = u32::try_from(row_index + 1).map_err(report_error)?;
            for (col, column) in (0..col_count).zip(columns) {
                let written = match cell_number(row, &column.field) {
                    Some(number) => worksheet.write_number(xlsx_row, col, number),
                    None => worksheet.write_string(xlsx_row, col, cell_text(row, &column.field)),
                };
                written.map_err(report_error)?;
            }
        }

        workbook.save_to_buffer().map_err(report_error)
    }

    // ========================================================================
    // PDF
    // ========================================================================

    fn render_pdf(
        &self,
        kind: ReportKind,
        request: &ReportRequest,
        columns: &[ColumnDef],
    ) -> AppResult<Vec<u8>> {
        let font_family = load_font_family(&self.config.font_dir, &self.config.font_family)
            .map_err(|e| report_error(format!("Font not found in {}: {}", self.config.font_dir, e)))?;

        let title = request
            .title
            .clone()
            .unwrap_or_else(|| kind.default_title().to_string());

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(title.clone());
        doc.set_paper_size(genpdf::PaperSize::A4);

        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        decorator.set_header(|page| {
            Paragraph::new(format!("Page {}", page))
                .aligned(Alignment::Right)
                .styled(Style::new().with_font_size(8))
        });
        doc.set_page_decorator(decorator);

        self.push_letterhead(&mut doc, request, &title);

        doc.push(StockTable::new(columns, &request.rows));

        push_signatures(&mut doc)?;

        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(report_error)?;

        Ok(buffer)
    }

    fn push_letterhead(&self, doc: &mut genpdf::Document, request: &ReportRequest, title: &str) {
        let logo = Path::new(&self.config.logo_path);
        if logo.exists() {
            match elements::Image::from_path(logo) {
                Ok(image) => {
                    doc.push(
                        image
                            .with_alignment(Alignment::Center)
                            .with_scale(genpdf::Scale::new(0.5, 0.5)),
                    );
                }
                Err(e) => tracing::warn!("Skipping report logo {}: {}", logo.display(), e),
            }
        }

        doc.push(
            Paragraph::new(self.config.company_name.clone())
                .aligned(Alignment::Center)
                .styled(Style::new().bold().with_font_size(16)),
        );
        doc.push(
            Paragraph::new(title.to_string())
                .aligned(Alignment::Center)
                .styled(Style::new().bold().with_font_size(13)),
        );

        let mut details = Vec::new();
        if let Some(department) = request.department.as_deref() {
            details.push(format!("Department: {}", department));
        }
        if let Some(scheme) = request.scheme.as_deref() {
            let label = shared::report::relabel_header("Scheme", request.department.as_deref());
            details.push(format!("{}: {}", label, scheme));
        }
        details.push(format!("Date: {}", chrono::Utc::now().format("%d/%m/%Y")));

        doc.push(
            Paragraph::new(details.join("    "))
                .aligned(Alignment::Center)
                .styled(Style::new().with_font_size(9)),
        );
        doc.push(Break::new(1.5));
    }
}

const HEADER_SHADE: u8 = 200;
const ROW_SHADE: u8 = 235;

/// Free-text columns get twice the width
fn column_weight(field: &str) -> usize {
    match field {
        "description" | "address" | "notes" => 2,
        _ => 1,
    }
}

/// Load `{family}-Regular.ttf` and friends, falling back to the
/// `{family}.ttf` / `-Oblique` naming some font packages use.
fn load_font_family(dir: &str, family: &str) -> Result<FontFamily<FontData>, genpdf::error::Error> {
    if let Ok(fonts) = genpdf::fonts::from_files(dir, family, None) {
        return Ok(fonts);
    }

    let load = |suffix: &str| {
        FontData::load(Path::new(dir).join(format!("{}{}.ttf", family, suffix)), None)
    };
    Ok(FontFamily {
        regular: load("")?,
        bold: load("-Bold")?,
        italic: load("-Oblique")?,
        bold_italic: load("-BoldOblique")?,
    })
}

fn push_signatures(doc: &mut genpdf::Document) -> AppResult<()> {
    doc.push(Break::new(3));

    let mut table = TableLayout::new(vec![1, 1, 1]);
    let mut lines = table.row();
    let mut labels = Vec::new();
    for label in ["Prepared by", "Checked by", "Approved by"] {
        lines = lines.element(Paragraph::new("____________________").aligned(Alignment::Center));
        labels.push(label);
    }
    lines.push().map_err(report_error)?;

    let mut captions = table.row();
    for label in labels {
        captions = captions.element(
            Paragraph::new(label)
                .aligned(Alignment::Center)
                .styled(Style::new().with_font_size(9)),
        );
    }
    captions.push().map_err(report_error)?;

    doc.push(table);
    Ok(())
}

const TABLE_FONT_SIZE: u8 = 9;
const CELL_PADDING: f64 = 1.0;
/// genpdf strokes lines 1 pt (0.35 mm) wide, so lines this far apart overlap
const SHADE_STEP: f64 = 0.3;

/// Report table that lays itself out page by page
///
/// genpdf calls `render` again on a fresh page while `has_more` is set. Each
/// call draws the column header, then as many rows as fit in the height it
/// was given. Rows are a single line; longer text is clipped to its cell.
struct StockTable {
    headers: Vec<String>,
    weights: Vec<usize>,
    rows: Vec<Vec<String>>,
    next_row: usize,
}

impl StockTable {
    fn new(columns: &[ColumnDef], rows: &[Value]) -> Self {
        Self {
            headers: columns.iter().map(|c| c.header_name.clone()).collect(),
            weights: columns.iter().map(|c| column_weight(&c.field)).collect(),
            rows: rows
                .iter()
                .map(|row| columns.iter().map(|c| cell_text(row, &c.field)).collect())
                .collect(),
            next_row: 0,
        }
    }
}

impl Element for StockTable {
    fn render(
        &mut self,
        context: &Context,
        mut area: Area<'_>,
        style: Style,
    ) -> Result<RenderResult, genpdf::error::Error> {
        let cell_style = style.with_font_size(TABLE_FONT_SIZE);
        let row_height =
            cell_style.line_height(&context.font_cache) + Mm::from(2.0 * CELL_PADDING);
        let remaining = self.rows.len() - self.next_row;

        let fit = rows_that_fit(
            f64::from(area.size().height),
            f64::from(row_height),
            f64::from(row_height),
        );
        if fit == 0 && remaining > 0 {
            // Nothing fits below what is already on this page
            return Ok(RenderResult {
                size: Size::new(0, 0),
                has_more: true,
            });
        }

        let width = area.size().width;
        let count = fit.min(remaining);

        draw_row(
            context,
            &area,
            &self.weights,
            &self.headers,
            cell_style.bold(),
            row_height,
            Some(HEADER_SHADE),
        )?;
        area.add_offset(Position::new(0, row_height));

        for (offset, cells) in self.rows[self.next_row..self.next_row + count].iter().enumerate() {
            let shade = ((self.next_row + offset) % 2 == 1).then_some(ROW_SHADE);
            draw_row(context, &area, &self.weights, cells, cell_style, row_height, shade)?;
            area.add_offset(Position::new(0, row_height));
        }

        self.next_row += count;
        Ok(RenderResult {
            size: Size::new(width, row_height * (count + 1) as f64),
            has_more: self.next_row < self.rows.len(),
        })
    }
}

fn draw_row(
    context: &Context,
    area: &Area<'_>,
    weights: &[usize],
    cells: &[String],
    style: Style,
    height: Mm,
    shade: Option<u8>,
) -> Result<(), genpdf::error::Error> {
    let mut row = area.clone();
    row.set_height(height);

    if let Some(grey) = shade {
        shade_band(&row, grey);
    }

    let font_cache = &context.font_cache;
    for (cell, text) in row.split_horizontally(weights).iter().zip(cells) {
        let max_width = f64::from(cell.size().width) - 2.0 * CELL_PADDING;
        let text = clip_to_width(text, max_width, |s| f64::from(style.str_width(font_cache, s)));
        cell.print_str(font_cache, Position::new(CELL_PADDING, CELL_PADDING), style, text)?;
    }
    Ok(())
}

/// Fill `area` with grey. genpdf has no fill primitive, so the band is a
/// stack of overlapping horizontal lines.
fn shade_band(area: &Area<'_>, grey: u8) {
    let style = Style::new().with_color(Color::Greyscale(grey));
    let width = area.size().width;
    let height = f64::from(area.size().height);

    let mut y = SHADE_STEP / 2.0;
    while y < height {
        area.draw_line(vec![Position::new(0, y), Position::new(width, y)], style);
        y += SHADE_STEP;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service() -> ReportingService {
        ReportingService::new(ReportConfig {
            font_dir: "./no-such-font-dir".to_string(),
            font_family: "LiberationSans".to_string(),
            logo_path: "./no-such-logo.png".to_string(),
            company_name: "Test Co".to_string(),
        })
    }

    fn request(columns: Option<Vec<ColumnDef>>) -> ReportRequest {
        ReportRequest {
            rows: vec![json!({"scheme": "S1", "materialCode": "M1", "StockIn": 10, "StockOut": 4, "Remaining": 6})],
            columns,
            department: Some("Telecom".to_string()),
            title: None,
            scheme: Some("S1".to_string()),
        }
    }

    #[test]
    fn test_xlsx_is_a_zip_archive() {
        let columns = vec![ColumnDef::new("scheme", "Scheme"), ColumnDef::new("Remaining", "Remaining")];
        let bytes = service()
            .render(ReportFormat::Xlsx, ReportKind::RemainingStock, &request(Some(columns)))
            .unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_xlsx_requires_columns() {
        let result = service().render(ReportFormat::Xlsx, ReportKind::RemainingStock, &request(None));
        assert!(matches!(result, Err(AppError::Validation { ref field, .. }) if field == "columns"));
    }

    #[test]
    fn test_empty_rows_rejected() {
        let mut req = request(None);
        req.rows.clear();
        let result = service().render(ReportFormat::Pdf, ReportKind::StoreIn, &req);
        assert!(matches!(result, Err(AppError::Validation { ref field, .. }) if field == "rows"));
    }

    #[test]
    fn test_pdf_default_columns_relabeled() {
        let columns = service().columns(ReportKind::RemainingStock, &request(None));
        assert_eq!(columns[0].header_name, "PO");
        assert_eq!(columns.len(), remaining_stock_columns().len());
    }

    #[test]
    fn test_missing_font_is_report_error() {
        let result = service().render(ReportFormat::Pdf, ReportKind::RemainingStock, &request(None));
        assert!(matches!(result, Err(AppError::Report(_))));
    }

    /// An installed font family the renderer can load, if any
    fn installed_fonts() -> Option<ReportConfig> {
        [
            ("/usr/share/fonts/truetype/liberation", "LiberationSans"),
            ("/usr/share/fonts/liberation-sans", "LiberationSans"),
            ("/usr/share/fonts/truetype/dejavu", "DejaVuSans"),
            ("/usr/share/fonts/dejavu", "DejaVuSans"),
        ]
        .into_iter()
        .find(|(dir, family)| load_font_family(dir, family).is_ok())
        .map(|(dir, family)| ReportConfig {
            font_dir: dir.to_string(),
            font_family: family.to_string(),
            logo_path: "./no-such-logo.png".to_string(),
            company_name: "Test Co".to_string(),
        })
    }

    /// Objects of type `/Page` in a rendered PDF. `/Pages` and other names
    /// that merely start with `/Page` are not counted.
    fn page_count(pdf: &[u8]) -> usize {
        let text = String::from_utf8_lossy(pdf).into_owned();
        text.match_indices("/Type")
            .filter(|(i, _)| {
                let rest = text[i + "/Type".len()..].trim_start();
                rest.strip_prefix("/Page")
                    .map_or(false, |after| !after.starts_with(|c: char| c.is_ascii_alphanumeric()))
            })
            .count()
    }

    fn stock_rows(count: usize, description: &str) -> ReportRequest {
        ReportRequest {
            rows: (0..count)
                .map(|i| {
                    json!({
                        "scheme": "S1",
                        "materialCode": format!("M{}", i),
                        "description": description,
                        "unit": "m",
                        "StockIn": 10,
                        "StockOut": 4,
                        "Remaining": 6
                    })
                })
                .collect(),
            columns: None,
            department: Some("Electrical".to_string()),
            title: None,
            scheme: Some("S1".to_string()),
        }
    }

    fn render_pages(config: &ReportConfig, request: &ReportRequest) -> usize {
        let bytes = ReportingService::new(config.clone())
            .render(ReportFormat::Pdf, ReportKind::RemainingStock, request)
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        page_count(&bytes)
    }

    #[test]
    fn test_pdf_renders_shaded_table() {
        let Some(config) = installed_fonts() else {
            eprintln!("no system font family found, skipping");
            return;
        };
        assert_eq!(render_pages(&config, &stock_rows(3, "Copper cable")), 1);
    }

    #[test]
    fn test_long_text_does_not_add_pages() {
        let Some(config) = installed_fonts() else {
            eprintln!("no system font family found, skipping");
            return;
        };
        let long = "Armoured copper cable, four core, 16 sq mm, with galvanised steel wire ".repeat(4);
        let short_pages = render_pages(&config, &stock_rows(60, "Cable"));
        let long_pages = render_pages(&config, &stock_rows(60, &long));
        assert_eq!(short_pages, long_pages);
    }

    #[test]
    fn test_rows_fill_pages_before_breaking() {
        let Some(config) = installed_fonts() else {
            eprintln!("no system font family found, skipping");
            return;
        };
        // Single-line 9 pt rows run to roughly 45 per A4 page
        let pages = render_pages(&config, &stock_rows(150, "Cable"));
        assert!((3..=5).contains(&pages), "150 rows took {} pages", pages);
        assert!(render_pages(&config, &stock_rows(300, "Cable")) > pages);
    }

    #[test]
    fn test_file_names() {
        assert_eq!(ReportFormat::Pdf.file_name(ReportKind::StoreIn), "storein_report.pdf");
        assert_eq!(ReportFormat::Xlsx.file_name(ReportKind::StockOut), "stockout_report.xlsx");
    }
}
