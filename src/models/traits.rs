/// Coarse content flags inferred from a mod's metadata and raw files.
///
/// These only bias auto-sort grouping; nothing correctness-critical reads them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModTraits {
    pub before_vanilla: bool,
    pub is_graphics_pack: bool,
    pub adds_reaction: bool,
    pub adds_creature: bool,
    pub adds_new_content: bool,
    pub touches_vanilla_entity: bool,
    pub adds_new_entity: bool,
}

impl ModTraits {
    /// True once every raw-file flag is known, so the scan can stop early.
    pub fn fully_determined(&self) -> bool {
        self.adds_reaction
            && self.adds_creature
            && self.adds_new_content
            && self.is_graphics_pack
            && (self.touches_vanilla_entity || self.adds_new_entity)
    }
}
