use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use rebalance_core::{Matrix, RebalanceError, RebalanceResult};
use rebalance_io::Frame;

use crate::stats::value_counts;

const BAR_WIDTH: usize = 40;
const PLOT_WIDTH: usize = 48;
const PLOT_HEIGHT: usize = 14;
const GLYPHS: [char; 6] = ['o', 'x', '+', '*', '#', '@'];
const EIGHTHS: [char; 8] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉'];

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|n| {
            Cell::new(n)
                .fg(Color::Cyan)
                .set_alignment(CellAlignment::Center)
        })
        .collect()
}

/// Number rendered for a table cell: integers plain, large values with one
/// decimal, small values with three.
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.fract() == 0.0 && v.abs() < 1e9 {
        format!("{v:.0}")
    } else if v.abs() >= 100.0 {
        format!("{v:.1}")
    } else {
        format!("{v:.3}")
    }
}

/// Horizontal bar of `value / max * width` cells, in eighths.
fn bar(value: usize, max: usize, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let eighths = value * width * 8 / max;
    let mut s = "█".repeat(eighths / 8);
    if eighths % 8 > 0 {
        s.push(EIGHTHS[eighths % 8]);
    }
    s
}

/// Bar chart of category counts, one row per category.
pub fn bar_chart(title: &str, counts: &[(String, usize)]) -> String {
    let max = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let total: usize = counts.iter().map(|(_, c)| c).sum();

    let mut table = new_table();
    table.set_header(header(&["value", "", "count", "share"]));
    for (label, count) in counts {
        let share = if total == 0 {
            0.0
        } else {
            *count as f64 / total as f64 * 100.0
        };
        table.add_row(vec![
            Cell::new(label).fg(Color::White),
            Cell::new(bar(*count, max, BAR_WIDTH)).fg(Color::Green),
            Cell::new(count).set_alignment(CellAlignment::Right),
            Cell::new(format!("{share:.1}%")).set_alignment(CellAlignment::Right),
        ]);
    }
    format!("{title}\n{table}")
}

/// Bar chart of the distinct values of one frame column.
pub fn count_plot(frame: &Frame, column: &str) -> RebalanceResult<String> {
    let counts = value_counts(frame.column(column)?);
    Ok(bar_chart(&format!("{column} value counts"), &counts))
}

/// Sequential blue scale for `t` in `[0, 1]`.
fn shade(t: f64) -> (Color, Color) {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    let bg = Color::Rgb {
        r: lerp(247, 8),
        g: lerp(251, 48),
        b: lerp(255, 107),
    };
    let fg = if t > 0.5 { Color::White } else { Color::Black };
    (bg, fg)
}

fn render_heatmap(
    title: &str,
    row_labels: &[String],
    col_labels: &[String],
    values: &[Vec<f64>],
    format: fn(f64) -> String,
) -> RebalanceResult<String> {
    if values.len() != row_labels.len() || values.iter().any(|r| r.len() != col_labels.len()) {
        return Err(RebalanceError::ShapeMismatch {
            expected: vec![row_labels.len(), col_labels.len()],
            got: vec![values.len(), values.first().map_or(0, Vec::len)],
        });
    }
    let finite = values.iter().flatten().copied().filter(|v| v.is_finite());
    let (lo, hi) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let span = if hi > lo { hi - lo } else { 1.0 };

    let mut table = new_table();
    let mut head = vec![Cell::new("")];
    head.extend(col_labels.iter().map(|c| {
        Cell::new(c)
            .fg(Color::Cyan)
            .set_alignment(CellAlignment::Center)
    }));
    table.set_header(head);

    for (label, row) in row_labels.iter().zip(values) {
        let mut cells = vec![Cell::new(label).fg(Color::Cyan)];
        cells.extend(row.iter().map(|&v| {
            let (bg, fg) = shade((v - lo) / span);
            Cell::new(format(v))
                .bg(bg)
                .fg(fg)
                .set_alignment(CellAlignment::Right)
        }));
        table.add_row(cells);
    }
    Ok(format!("{title}\n{table}"))
}

/// Annotated heatmap: every cell shows its value on a background shaded
/// from the smallest to the largest value in the grid.
pub fn heatmap(
    title: &str,
    row_labels: &[String],
    col_labels: &[String],
    values: &[Vec<f64>],
) -> RebalanceResult<String> {
    render_heatmap(title, row_labels, col_labels, values, format_value)
}

/// Heatmap of a square matrix such as a correlation matrix.
pub fn matrix_heatmap(title: &str, labels: &[String], m: &Matrix) -> RebalanceResult<String> {
    let values: Vec<Vec<f64>> = m.iter_rows().map(<[f64]>::to_vec).collect();
    render_heatmap(title, labels, labels, &values, |v| format!("{v:.2}"))
}

/// Confusion matrix heatmap; rows are true classes, columns predicted.
pub fn confusion_heatmap(title: &str, cm: &[Vec<usize>], labels: &[String]) -> RebalanceResult<String> {
    let values: Vec<Vec<f64>> = cm
        .iter()
        .map(|row| row.iter().map(|&c| c as f64).collect())
        .collect();
    let rows: Vec<String> = labels.iter().map(|l| format!("true {l}")).collect();
    let cols: Vec<String> = labels.iter().map(|l| format!("pred {l}")).collect();
    render_heatmap(title, &rows, &cols, &values, |v| format!("{v:.0}"))
}

/// Plain bordered table of string cells.
pub fn text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut table = new_table();
    table.set_header(header(headers));
    for row in rows {
        table.add_row(row.iter().map(Cell::new).collect::<Vec<_>>());
    }
    table.to_string()
}

/// First `n` rows of the frame as a table.
pub fn frame_table(frame: &Frame, n: usize) -> String {
    let head = frame.head(n);
    let names = head.column_names();
    let rows: Vec<Vec<String>> = (0..head.n_rows())
        .map(|i| head.columns().iter().map(|c| c.display_value(i)).collect())
        .collect();
    text_table(&names, &rows)
}

fn bounds(values: &[f64]) -> (f64, f64) {
    let (lo, hi) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        (0.0, 1.0)
    } else if lo == hi {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}

fn cell_index(v: f64, lo: f64, hi: f64, cells: usize) -> usize {
    let t = (v - lo) / (hi - lo);
    ((t * (cells - 1) as f64).round() as usize).min(cells - 1)
}

/// One scatter panel: `y` against `x`, glyph per class. Classes listed
/// later in `order` are drawn on top.
fn scatter(
    x_name: &str,
    y_name: &str,
    x: &[f64],
    y: &[f64],
    classes: &[usize],
    order: &[usize],
) -> String {
    let (x_lo, x_hi) = bounds(x);
    let (y_lo, y_hi) = bounds(y);
    let mut grid = vec![vec![' '; PLOT_WIDTH]; PLOT_HEIGHT];

    for &class in order {
        for ((&xv, &yv), _) in x.iter().zip(y).zip(classes).filter(|(_, &c)| c == class) {
            if !xv.is_finite() || !yv.is_finite() {
                continue;
            }
            let col = cell_index(xv, x_lo, x_hi, PLOT_WIDTH);
            let row = PLOT_HEIGHT - 1 - cell_index(yv, y_lo, y_hi, PLOT_HEIGHT);
            grid[row][col] = GLYPHS[class % GLYPHS.len()];
        }
    }

    let y_top = format_value(y_hi);
    let y_bottom = format_value(y_lo);
    let margin = y_top.len().max(y_bottom.len());
    let mut out = format!("{y_name} vs {x_name}\n");
    for (r, line) in grid.iter().enumerate() {
        let label = match r {
            0 => y_top.as_str(),
            r if r == PLOT_HEIGHT - 1 => y_bottom.as_str(),
            _ => "",
        };
        let line: String = line.iter().collect();
        out.push_str(&format!("{label:>margin$} │{line}\n"));
    }
    out.push_str(&format!("{:>margin$} └{}\n", "", "─".repeat(PLOT_WIDTH)));
    let x_left = format_value(x_lo);
    let x_right = format_value(x_hi);
    let gap = PLOT_WIDTH.saturating_sub(x_left.len() + x_right.len());
    out.push_str(&format!(
        "{:>margin$}  {x_left}{}{x_right}\n",
        "",
        " ".repeat(gap)
    ));
    out
}

/// Scatter grid of every pair of `features`, one glyph per value of the
/// `hue` column. Rarer classes are drawn last so they stay visible.
pub fn pair_plot(frame: &Frame, features: &[String], hue: &str) -> RebalanceResult<String> {
    let hue_values = frame.column(hue)?.to_strings();
    let counts = value_counts(frame.column(hue)?);
    if counts.len() > GLYPHS.len() {
        return Err(RebalanceError::InvalidParameter(format!(
            "pair plot supports at most {} hue classes, {hue:?} has {}",
            GLYPHS.len(),
            counts.len()
        )));
    }
    // glyph index by class name, sorted for a stable legend
    let mut names: Vec<&str> = counts.iter().map(|(n, _)| n.as_str()).collect();
    names.sort_unstable();
    let classes: Vec<usize> = hue_values
        .iter()
        .map(|v| names.iter().position(|n| *n == v.as_str()).unwrap_or(usize::MAX))
        .collect();
    let order: Vec<usize> = counts
        .iter()
        .filter_map(|(n, _)| names.iter().position(|m| *m == n.as_str()))
        .collect();

    let mut columns = Vec::with_capacity(features.len());
    for name in features {
        let values = frame.column(name)?.as_numeric().ok_or_else(|| {
            RebalanceError::InvalidParameter(format!("pair plot needs numeric column, {name:?} is not"))
        })?;
        columns.push(values);
    }

    let legend: Vec<String> = names
        .iter()
        .enumerate()
        .map(|(i, n)| format!("{} {n}", GLYPHS[i]))
        .collect();
    let mut out = format!("pair plot, hue = {hue} ({})\n", legend.join("  "));
    for a in 0..features.len() {
        for b in (a + 1)..features.len() {
            out.push('\n');
            out.push_str(&scatter(
                &features[a],
                &features[b],
                columns[a],
                columns[b],
                &classes,
                &order,
            ));
        }
    }
    Ok(out)
}
