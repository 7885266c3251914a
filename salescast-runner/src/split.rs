//! Chronological train/test split.

use polars::prelude::*;

/// Train and test partitions of a chronologically ordered table.
#[derive(Debug, Clone)]
pub struct Split {
    pub train: DataFrame,
    pub test: DataFrame,
}

/// Hold out the last `test_size` rows as the test partition.
///
/// The table must already be in chronological order. With fewer than
/// `test_size` rows the whole table is the test partition and train is empty.
pub fn split_chronological(df: &DataFrame, test_size: usize) -> Split {
    let cut = df.height().saturating_sub(test_size);
    Split {
        train: df.slice(0, cut),
        test: df.slice(cut as i64, test_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(n: i32) -> DataFrame {
        DataFrame::new(vec![Column::new("x".into(), (0..n).collect::<Vec<i32>>())]).unwrap()
    }

    fn values(df: &DataFrame) -> Vec<i32> {
        df.column("x").unwrap().i32().unwrap().into_no_null_iter().collect()
    }

    #[test]
    fn last_rows_form_the_test_set() {
        let split = split_chronological(&table(97), 30);
        assert_eq!(split.train.height(), 67);
        assert_eq!(split.test.height(), 30);
        assert_eq!(values(&split.test)[0], 67);
        assert_eq!(*values(&split.test).last().unwrap(), 96);
        assert_eq!(*values(&split.train).last().unwrap(), 66);
    }

    #[test]
    fn short_table_is_all_test() {
        let split = split_chronological(&table(12), 30);
        assert_eq!(split.train.height(), 0);
        assert_eq!(split.test.height(), 12);
        assert_eq!(split.train.width(), 1);
    }

    #[test]
    fn exact_size_leaves_empty_train() {
        let split = split_chronological(&table(30), 30);
        assert_eq!(split.train.height(), 0);
        assert_eq!(split.test.height(), 30);
    }

    #[test]
    fn zero_test_size() {
        let split = split_chronological(&table(5), 0);
        assert_eq!(split.train.height(), 5);
        assert_eq!(split.test.height(), 0);
    }
}
