/// Source of compiler-generated names.
///
/// Source identifiers cannot begin with `_`, so every name handed out here
/// is distinct from user names. Blobs and components have their own
/// counters; every other kind of temporary shares one.
#[derive(Debug, Default)]
pub struct NameSource {
    blobs: u32,
    components: u32,
    temps: u32,
}

impl NameSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blob(&mut self) -> String {
        let n = bump(&mut self.blobs);
        format!("_blob{n}")
    }

    pub fn component(&mut self) -> String {
        let n = bump(&mut self.components);
        format!("_component{n}")
    }

    /// `_{hint}{n}`, e.g. `_query0` or `_record1`.
    pub fn temp(&mut self, hint: &str) -> String {
        let n = bump(&mut self.temps);
        format!("_{hint}{n}")
    }
}

fn bump(counter: &mut u32) -> u32 {
    let n = *counter;
    *counter += 1;
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_independent() {
        let mut names = NameSource::new();
        assert_eq!(names.blob(), "_blob0");
        assert_eq!(names.component(), "_component0");
        assert_eq!(names.blob(), "_blob1");
        assert_eq!(names.component(), "_component1");
    }

    #[test]
    fn temps_share_one_counter() {
        let mut names = NameSource::new();
        assert_eq!(names.temp("query"), "_query0");
        assert_eq!(names.temp("record"), "_record1");
        assert_eq!(names.temp("query"), "_query2");
    }
}
