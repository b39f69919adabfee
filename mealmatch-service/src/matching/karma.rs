use super::round_one_decimal;

/// Average of every rating a user has received, one decimal. A user nobody
/// has reviewed has no karma at all rather than zero.
pub fn karma(ratings: &[i16]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }

    let total: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    Some(round_one_decimal(total as f64 / ratings.len() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_reviews_means_no_karma() {
        assert_eq!(karma(&[]), None);
    }

    #[test]
    fn mean_of_ratings() {
        assert_eq!(karma(&[5, 4, 3]), Some(4.0));
        assert_eq!(karma(&[5]), Some(5.0));
    }

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(karma(&[5, 4, 4]), Some(4.3));
        assert_eq!(karma(&[1, 2]), Some(1.5));
        assert_eq!(karma(&[5, 5, 4]), Some(4.7));
    }

    #[test]
    fn exact_halves_round_to_even() {
        assert_eq!(karma(&[1, 1, 1, 2]), Some(1.2));
        assert_eq!(karma(&[3, 3, 3, 4]), Some(3.2));
        assert_eq!(karma(&[1, 1, 2, 2, 2, 2, 2, 2]), Some(1.8));
    }
}
