/// Sanitises user-supplied HTML (forum posts, replies, lesson bodies).
///
/// Whitelist-based: safe tags like <b> and <p> survive, <script>/<iframe>
/// and event-handler attributes are stripped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
