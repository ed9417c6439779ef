// ABOUTME: Console deep links for failed stack operations.
// ABOUTME: Points a human at the failed stacks filtered by name in the given region.

/// Link to the provider console listing failed stacks matching `stack`.
pub fn console_url(region: &str, stack: &str) -> String {
    format!(
        "https://{region}.console.aws.amazon.com/cloudformation/home?region={region}#/stacks?filteringText={}&filteringStatus=failed&viewNested=true",
        urlencoding::encode(stack)
    )
}
