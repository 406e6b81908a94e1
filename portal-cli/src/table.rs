use std::{
    borrow::Cow,
    fmt::Display,
    io::{self, Write},
};

use console::{pad_str, Alignment, Term};

use crate::args::WorkColumn;

#[derive(Clone, Copy)]
pub struct ColumnBehavior {
    pub size: usize,
    pub grow: bool,
    pub min_size: usize,
}

impl ColumnBehavior {
    pub const fn fixed(size: usize) -> Self {
        Self {
            size,
            grow: false,
            min_size: size,
        }
    }

    pub const fn flexible(size: usize, min_size: usize) -> Self {
        Self {
            size,
            grow: true,
            min_size,
        }
    }
}

impl WorkColumn {
    pub fn behavior(&self) -> ColumnBehavior {
        match self {
            WorkColumn::Id => ColumnBehavior::fixed(6),
            WorkColumn::Title => ColumnBehavior::flexible(36, 12),
            WorkColumn::Author => ColumnBehavior {
                size: 24,
                grow: false,
                min_size: 10,
            },
            WorkColumn::Submitted => ColumnBehavior::fixed(10),
            WorkColumn::Tags => ColumnBehavior::flexible(24, 8),
            WorkColumn::Comments => ColumnBehavior::fixed(8),
            WorkColumn::Rating => ColumnBehavior::fixed(6),
            WorkColumn::Average => ColumnBehavior::fixed(8),
            WorkColumn::Bookmarked => ColumnBehavior::fixed(10),
            WorkColumn::Description => ColumnBehavior::flexible(42, 12),
            WorkColumn::File => ColumnBehavior::flexible(32, 12),
        }
    }
}

/// Shrinks columns down to their minimum, one character at a time, until
/// the table fits, or spreads spare width over the growable columns.
fn fit_columns(columns: &[ColumnBehavior], width: usize) -> Vec<usize> {
    let column_count = columns.len();
    let width = width.max(column_count * 3);

    let mut sizes: Vec<usize> = columns.iter().map(|b| b.size).collect();
    let total: usize = sizes.iter().sum::<usize>() + column_count;

    let grow_columns: Vec<usize> = (0..column_count).filter(|i| columns[*i].grow).collect();

    if total > width {
        let mut shrink_needed = total - width;

        while shrink_needed > 0 {
            let mut shrunk = false;

            for (size, column) in sizes.iter_mut().zip(columns) {
                if shrink_needed == 0 {
                    break;
                }

                if *size <= column.min_size {
                    continue;
                }

                *size -= 1;
                shrunk = true;
                shrink_needed -= 1;
            }

            if !shrunk {
                break;
            }
        }
    } else if total < width && !grow_columns.is_empty() {
        let growth_needed = width - total;
        let grow_column_count = grow_columns.len();
        let rem = growth_needed % grow_column_count;

        for (i, index) in grow_columns.into_iter().enumerate() {
            sizes[index] += growth_needed / grow_column_count + usize::from(i < rem);
        }
    }

    sizes
}

pub struct Table<'t> {
    column_widths: Vec<usize>,
    term: &'t Term,
    current_column: usize,
}

impl<'t> Table<'t> {
    pub fn new(term: &'t Term, columns: &[ColumnBehavior]) -> Self {
        let width = term.size().1 as usize;

        Self {
            column_widths: fit_columns(columns, width),
            term,
            current_column: 0,
        }
    }

    pub fn push_cell(&mut self, item: impl Display) -> io::Result<()> {
        let full_string = item.to_string().replace('\n', " ");

        let width = self.column_widths[self.current_column];

        let string = if self.term.is_term() {
            pad_str(&full_string, width, Alignment::Left, Some("..."))
        } else {
            Cow::Borrowed(full_string.as_str())
        };

        let ender = if self.current_column == self.column_widths.len() - 1 {
            "\n"
        } else if self.term.is_term() {
            " "
        } else {
            "\t"
        };

        let mut term = self.term;
        term.write_fmt(format_args!("{string}{ender}"))?;

        self.current_column = (self.current_column + 1) % self.column_widths.len();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{fit_columns, ColumnBehavior};

    #[test]
    fn test_shrink_to_minimum() {
        let columns = [ColumnBehavior::fixed(6), ColumnBehavior::flexible(36, 12)];

        assert_eq!(fit_columns(&columns, 30), vec![6, 22]);
        assert_eq!(fit_columns(&columns, 10), vec![6, 12]);
    }

    #[test]
    fn test_grow_spreads_evenly() {
        let columns = [
            ColumnBehavior::flexible(10, 5),
            ColumnBehavior::fixed(4),
            ColumnBehavior::flexible(10, 5),
        ];

        assert_eq!(fit_columns(&columns, 30), vec![12, 4, 11]);
    }
}
