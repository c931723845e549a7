/// Closest candidate to `target` within a small edit distance. Exact matches are
/// not suggestions and are skipped.
pub fn find_best_match<'a>(
    target: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<&'a str> {
    let threshold = if target.chars().count() < 5 { 1 } else { 2 };
    let mut best_candidate = None;
    let mut min_distance = usize::MAX;

    for candidate in candidates {
        let distance = levenshtein_distance(target, candidate);
        if distance == 0 {
            continue;
        }
        if distance <= threshold && distance < min_distance {
            min_distance = distance;
            best_candidate = Some(candidate);
        }
    }

    best_candidate
}

fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_len = s1.chars().count();
    let s2_len = s2.chars().count();
    let mut matrix = vec![vec![0; s2_len + 1]; s1_len + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=s2_len {
        matrix[0][j] = j;
    }

    for (i, char1) in s1.chars().enumerate() {
        for (j, char2) in s2.chars().enumerate() {
            let cost = usize::from(char1 != char2);
            matrix[i + 1][j + 1] = std::cmp::min(
                std::cmp::min(matrix[i][j + 1] + 1, matrix[i + 1][j] + 1),
                matrix[i][j] + cost,
            );
        }
    }

    matrix[s1_len][s2_len]
}

#[cfg(test)]
mod tests {
    use super::find_best_match;

    #[test]
    fn suggests_close_marker_names() {
        let candidates = ["Remote", "Service", "Local"];
        assert_eq!(find_best_match("Remot", candidates), Some("Remote"));
        assert_eq!(find_best_match("Servise", candidates), Some("Service"));
    }

    #[test]
    fn ignores_exact_and_distant_names() {
        let candidates = ["Remote", "Service", "Local"];
        assert_eq!(find_best_match("Remote", candidates), None);
        assert_eq!(find_best_match("Override", candidates), None);
        assert_eq!(find_best_match("Lock", candidates), None);
    }
}
