fn main() {
    println!("cargo:rerun-if-changed=./speciesnet.proto");
    tonic_build::compile_protos("./speciesnet.proto")
        .unwrap_or_else(|err| panic!("Failed to compile protos {:?}", err));
}
