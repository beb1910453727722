/// `embed_migrations!` cannot track changes to the migration files on its own,
/// so the crate is rebuilt whenever the migrations directory changes.
fn main() {
    println!("cargo:rerun-if-changed=./migrations");
}
