//! Common stylesheet fixtures for tests.

// Single-sheet basics
pub const SIMPLE_CLASSES: &str = ".btn { color: red; }\n.icon { display: block; }";

pub const VARS_AND_USAGE: &str = r#"
:vars {
    mainColor: red;
    border: 1px solid value(mainColor);
}
.btn {
    color: value(mainColor);
    border: value(border);
}
"#;

// A component sheet used as an import target
pub const COMP_SHEET: &str = r#"
.root { background: white; }
.label { color: black; }
"#;

// Mixin source with variables, a state rule, and a conditional block
pub const MIXIN_SHEET: &str = r#"
:vars {
    color: red;
    size: 1px;
}
.mix {
    background: value(color);
    width: value(size);
}
.mix:hover {
    color: value(color);
}
@media screen {
    .mix {
        display: grid;
    }
}
"#;

// Root-extends chain: comp's root extends base's root
pub const BASE_SHEET: &str = r#"
.root { color: blue; }
.part { color: navy; }
"#;

pub const EXTENDING_COMP_SHEET: &str = r#"
@st-import Base from "./base.st.css";
.root {
    -st-extends: Base;
    background: white;
}
"#;

// Two sheets whose roots mix each other in
pub const CYCLE_A: &str = r#"
@st-import B from "./b.st.css";
.root {
    -st-mixin: B;
    color: red;
}
"#;

pub const CYCLE_B: &str = r#"
@st-import A from "./a.st.css";
.root {
    -st-mixin: A;
    color: blue;
}
"#;
