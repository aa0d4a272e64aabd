//! Longest-common-subsequence diff over lines (or characters for
//! fine-grained use). Common prefix and suffix are trimmed before the
//! O(n*m) table is built; the backward walk produces a reverse-order edit
//! script that is reversed and rejoined with the trimmed affixes.

/// One token of the edit script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit<T> {
    Unmodified(T),
    /// Present in the old content only.
    Deleted(T),
    /// Present in the new content only.
    Inserted(T),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub unmodified: usize,
    pub deleted: usize,
    pub inserted: usize,
}

impl DiffSummary {
    pub fn of<T>(edits: &[Edit<T>]) -> Self {
        let mut summary = Self::default();
        for edit in edits {
            match edit {
                Edit::Unmodified(_) => summary.unmodified += 1,
                Edit::Deleted(_) => summary.deleted += 1,
                Edit::Inserted(_) => summary.inserted += 1,
            }
        }
        summary
    }

    /// Content the new generation would add that the old file lacks.
    pub fn has_insertions(&self) -> bool {
        self.inserted > 0
    }
}

pub fn diff_slices<T: PartialEq + Clone>(old: &[T], new: &[T]) -> Vec<Edit<T>> {
    let mut prefix = 0;
    while prefix < old.len() && prefix < new.len() && old[prefix] == new[prefix] {
        prefix += 1;
    }

    let mut suffix = 0;
    while suffix < old.len() - prefix
        && suffix < new.len() - prefix
        && old[old.len() - 1 - suffix] == new[new.len() - 1 - suffix]
    {
        suffix += 1;
    }

    let old_mid = &old[prefix..old.len() - suffix];
    let new_mid = &new[prefix..new.len() - suffix];

    let mut edits: Vec<Edit<T>> = old[..prefix]
        .iter()
        .map(|t| Edit::Unmodified(t.clone()))
        .collect();
    edits.extend(lcs_edits(old_mid, new_mid));
    edits.extend(
        old[old.len() - suffix..]
            .iter()
            .map(|t| Edit::Unmodified(t.clone())),
    );
    edits
}

fn lcs_edits<T: PartialEq + Clone>(old: &[T], new: &[T]) -> Vec<Edit<T>> {
    let n = old.len();
    let m = new.len();

    // table[i][j] = LCS length of old[..i] and new[..j]
    let mut table = vec![vec![0usize; m + 1]; n + 1];
    for i in 1..=n {
        for j in 1..=m {
            table[i][j] = if old[i - 1] == new[j - 1] {
                table[i - 1][j - 1] + 1
            } else {
                table[i - 1][j].max(table[i][j - 1])
            };
        }
    }

    // backward walk emits the script in reverse order; preferring the
    // insertion branch here yields deleted-before-inserted after reversal
    let mut script = Vec::with_capacity(n + m);
    let (mut i, mut j) = (n, m);
    while i > 0 && j > 0 {
        if old[i - 1] == new[j - 1] {
            script.push(Edit::Unmodified(old[i - 1].clone()));
            i -= 1;
            j -= 1;
        } else if table[i][j - 1] >= table[i - 1][j] {
            script.push(Edit::Inserted(new[j - 1].clone()));
            j -= 1;
        } else {
            script.push(Edit::Deleted(old[i - 1].clone()));
            i -= 1;
        }
    }
    while i > 0 {
        script.push(Edit::Deleted(old[i - 1].clone()));
        i -= 1;
    }
    while j > 0 {
        script.push(Edit::Inserted(new[j - 1].clone()));
        j -= 1;
    }

    script.reverse();
    script
}

pub fn diff_lines<'a>(old: &'a str, new: &'a str) -> Vec<Edit<&'a str>> {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    diff_slices(&old_lines, &new_lines)
}

pub fn diff_chars(old: &str, new: &str) -> Vec<Edit<char>> {
    let old_chars: Vec<char> = old.chars().collect();
    let new_chars: Vec<char> = new.chars().collect();
    diff_slices(&old_chars, &new_chars)
}

/// Rebuild the new content from unmodified and inserted lines.
pub fn reconstruct_new(edits: &[Edit<&str>]) -> String {
    edits
        .iter()
        .filter_map(|e| match e {
            Edit::Unmodified(line) | Edit::Inserted(line) => Some(*line),
            Edit::Deleted(_) => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rebuild the old content from unmodified and deleted lines.
pub fn reconstruct_old(edits: &[Edit<&str>]) -> String {
    edits
        .iter()
        .filter_map(|e| match e {
            Edit::Unmodified(line) | Edit::Deleted(line) => Some(*line),
            Edit::Inserted(_) => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_replacement() {
        let edits = diff_lines("a\nb\nc", "a\nx\nc");
        assert_eq!(
            edits,
            vec![
                Edit::Unmodified("a"),
                Edit::Deleted("b"),
                Edit::Inserted("x"),
                Edit::Unmodified("c"),
            ]
        );

        let summary = DiffSummary::of(&edits);
        assert_eq!(summary.unmodified, 2);
        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.inserted, 1);

        assert_eq!(reconstruct_new(&edits), "a\nx\nc");
        assert_eq!(reconstruct_old(&edits), "a\nb\nc");
    }

    #[test]
    fn pure_insertion_and_deletion() {
        let edits = diff_lines("a\nc", "a\nb\nc");
        assert_eq!(DiffSummary::of(&edits).inserted, 1);
        assert_eq!(DiffSummary::of(&edits).deleted, 0);
        assert_eq!(reconstruct_new(&edits), "a\nb\nc");

        let edits = diff_lines("a\nb\nc", "a\nc");
        assert_eq!(DiffSummary::of(&edits).inserted, 0);
        assert_eq!(DiffSummary::of(&edits).deleted, 1);
        assert_eq!(reconstruct_old(&edits), "a\nb\nc");
    }

    #[test]
    fn identical_inputs_are_all_unmodified() {
        let edits = diff_lines("a\nb", "a\nb");
        assert!(edits.iter().all(|e| matches!(e, Edit::Unmodified(_))));
    }

    #[test]
    fn empty_sides() {
        let edits = diff_lines("", "a\nb");
        assert_eq!(DiffSummary::of(&edits).inserted, 2);
        let edits = diff_lines("a\nb", "");
        assert_eq!(DiffSummary::of(&edits).deleted, 2);
    }

    #[test]
    fn char_diff_supports_fine_grained_use() {
        let edits = diff_chars("kitten", "sitting");
        let summary = DiffSummary::of(&edits);
        assert_eq!(summary.unmodified, 4); // i-t-t-n
        assert_eq!(summary.deleted, 2); // k, e
        assert_eq!(summary.inserted, 3); // s, i, g
    }

    #[test]
    fn both_sides_reconstruct_for_disjoint_content() {
        let old = "one\ntwo\nthree";
        let new = "four\nfive";
        let edits = diff_lines(old, new);
        assert_eq!(reconstruct_old(&edits), old);
        assert_eq!(reconstruct_new(&edits), new);
    }
}
