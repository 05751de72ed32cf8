use crate::sources::openfda::OpenFdaCountResponse;

/// Reaction terms in the order OpenFDA ranked them.
pub(crate) fn side_effect_terms(resp: OpenFdaCountResponse) -> Option<Vec<String>> {
    resp.results
        .map(|buckets| buckets.into_iter().map(|b| b.term).collect())
}
