pub mod symtab;
