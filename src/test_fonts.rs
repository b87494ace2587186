//! Small TrueType programs assembled in memory for tests.
//!
//! Only the tables certstamp reads are written: `head`, `hhea`, `maxp`,
//! `hmtx`, a format 12 `cmap`, a format 0 `kern` and a version 0 `OS/2`.
//! Glyph 0 is `.notdef`; glyph `i + 1` is the `i`-th mapped character.

pub(crate) struct SyntheticFace {
    notdef_advance: u16,
    glyphs: Vec<(char, u16)>,
    kerning: Vec<(char, char, i16)>,
    fs_type: u16,
}

impl SyntheticFace {
    pub(crate) fn new(notdef_advance: u16) -> Self {
        Self {
            notdef_advance,
            glyphs: Vec::new(),
            kerning: Vec::new(),
            fs_type: 0,
        }
    }

    pub(crate) fn glyph(mut self, ch: char, advance: u16) -> Self {
        self.glyphs.push((ch, advance));
        self
    }

    pub(crate) fn kern(mut self, left: char, right: char, value: i16) -> Self {
        self.kerning.push((left, right, value));
        self
    }

    /// Marks the licence as restricted (fsType 0x0002).
    pub(crate) fn restricted(mut self) -> Self {
        self.fs_type = 0x0002;
        self
    }

    fn glyph_id(&self, ch: char) -> u16 {
        self.glyphs
            .iter()
            .position(|(mapped, _)| *mapped == ch)
            .map(|idx| idx as u16 + 1)
            .expect("kerned character has a glyph")
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let num_glyphs = self.glyphs.len() as u16 + 1;
        let mut tables: Vec<([u8; 4], Vec<u8>)> = vec![
            (*b"OS/2", self.os2()),
            (*b"cmap", self.cmap()),
            (*b"head", head()),
            (*b"hhea", self.hhea(num_glyphs)),
            (*b"hmtx", self.hmtx()),
            (*b"kern", self.kern_table()),
            (*b"maxp", maxp(num_glyphs)),
        ];
        tables.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = Vec::new();
        put_u32(&mut out, 0x0001_0000);
        put_u16(&mut out, tables.len() as u16);
        put_u16(&mut out, 0);
        put_u16(&mut out, 0);
        put_u16(&mut out, 0);
        let mut offset = 12 + 16 * tables.len();
        let mut body = Vec::new();
        for (tag, data) in &tables {
            out.extend_from_slice(tag);
            put_u32(&mut out, 0);
            put_u32(&mut out, offset as u32);
            put_u32(&mut out, data.len() as u32);
            body.extend_from_slice(data);
            while body.len() % 4 != 0 {
                body.push(0);
            }
            offset = 12 + 16 * tables.len() + body.len();
        }
        out.extend_from_slice(&body);
        out
    }

    fn hhea(&self, num_glyphs: u16) -> Vec<u8> {
        let max_advance = self
            .glyphs
            .iter()
            .map(|(_, advance)| *advance)
            .chain([self.notdef_advance])
            .max()
            .unwrap_or(0);
        let mut out = Vec::new();
        put_u32(&mut out, 0x0001_0000);
        put_i16(&mut out, 800);
        put_i16(&mut out, -200);
        put_i16(&mut out, 0);
        put_u16(&mut out, max_advance);
        for _ in 0..3 {
            put_i16(&mut out, 0);
        }
        put_i16(&mut out, 1);
        for _ in 0..6 {
            put_i16(&mut out, 0);
        }
        put_i16(&mut out, 0);
        put_u16(&mut out, num_glyphs);
        out
    }

    fn hmtx(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for advance in [self.notdef_advance]
            .into_iter()
            .chain(self.glyphs.iter().map(|(_, advance)| *advance))
        {
            put_u16(&mut out, advance);
            put_i16(&mut out, 0);
        }
        out
    }

    fn cmap(&self) -> Vec<u8> {
        let mut groups: Vec<(u32, u32)> = self
            .glyphs
            .iter()
            .enumerate()
            .map(|(idx, (ch, _))| (*ch as u32, idx as u32 + 1))
            .collect();
        groups.sort();

        let mut out = Vec::new();
        put_u16(&mut out, 0);
        put_u16(&mut out, 1);
        put_u16(&mut out, 3);
        put_u16(&mut out, 10);
        put_u32(&mut out, 12);
        put_u16(&mut out, 12);
        put_u16(&mut out, 0);
        put_u32(&mut out, 16 + 12 * groups.len() as u32);
        put_u32(&mut out, 0);
        put_u32(&mut out, groups.len() as u32);
        for (code, gid) in groups {
            put_u32(&mut out, code);
            put_u32(&mut out, code);
            put_u32(&mut out, gid);
        }
        out
    }

    fn kern_table(&self) -> Vec<u8> {
        let mut pairs: Vec<(u16, u16, i16)> = self
            .kerning
            .iter()
            .map(|(l, r, v)| (self.glyph_id(*l), self.glyph_id(*r), *v))
            .collect();
        pairs.sort();

        let mut out = Vec::new();
        put_u16(&mut out, 0);
        put_u16(&mut out, 1);
        put_u16(&mut out, 0);
        put_u16(&mut out, (6 + 8 + 6 * pairs.len()) as u16);
        // format 0, horizontal
        put_u16(&mut out, 0x0001);
        put_u16(&mut out, pairs.len() as u16);
        put_u16(&mut out, 0);
        put_u16(&mut out, 0);
        put_u16(&mut out, 0);
        for (left, right, value) in pairs {
            put_u16(&mut out, left);
            put_u16(&mut out, right);
            put_i16(&mut out, value);
        }
        out
    }

    fn os2(&self) -> Vec<u8> {
        let mut out = Vec::new();
        put_u16(&mut out, 0);
        put_i16(&mut out, 500);
        put_u16(&mut out, 700);
        put_u16(&mut out, 5);
        put_u16(&mut out, self.fs_type);
        out.resize(78, 0);
        out
    }
}

/// Upper-case Latin set used by the embedding tests. Advances differ from
/// Helvetica so a wrong face shows up in width assertions.
pub(crate) fn display_face() -> SyntheticFace {
    let mut face = SyntheticFace::new(500)
        .glyph(' ', 250)
        .glyph('?', 480)
        .glyph('-', 300)
        .glyph('/', 280)
        .glyph('Š', 590)
        .glyph('Ž', 570)
        .glyph('É', 540);
    for (idx, ch) in ('A'..='Z').enumerate() {
        face = face.glyph(ch, 500 + (idx as u16 % 5) * 40);
    }
    for ch in '0'..='9' {
        face = face.glyph(ch, 520);
    }
    face.kern('A', 'V', -80).kern('V', 'A', -80).kern('A', 'W', -60)
}

fn head() -> Vec<u8> {
    let mut out = Vec::new();
    put_u32(&mut out, 0x0001_0000);
    put_u32(&mut out, 0x0001_0000);
    put_u32(&mut out, 0);
    put_u32(&mut out, 0x5F0F_3CF5);
    put_u16(&mut out, 0x000B);
    put_u16(&mut out, 1000);
    out.extend_from_slice(&[0; 16]);
    put_i16(&mut out, 0);
    put_i16(&mut out, -200);
    put_i16(&mut out, 1000);
    put_i16(&mut out, 800);
    put_u16(&mut out, 0);
    put_u16(&mut out, 8);
    put_i16(&mut out, 2);
    put_i16(&mut out, 0);
    put_i16(&mut out, 0);
    out
}

fn maxp(num_glyphs: u16) -> Vec<u8> {
    let mut out = Vec::new();
    put_u32(&mut out, 0x0000_5000);
    put_u16(&mut out, num_glyphs);
    out
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn put_i16(out: &mut Vec<u8>, value: i16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}
