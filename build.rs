fn main() {
    // Manual service definition: the wire messages are prost structs in
    // src/wire.rs, so there is no .proto file to compile.
    let service = tonic_build::manual::Service::builder()
        .name("MqService")
        .package("mq.v1")
        .method(
            tonic_build::manual::Method::builder()
                .name("publish")
                .route_name("Pub")
                .input_type("crate::wire::PubRequest")
                .output_type("crate::wire::PubResponse")
                .codec_path("tonic::codec::ProstCodec")
                .build(),
        )
        .method(
            tonic_build::manual::Method::builder()
                .name("subscribe")
                .route_name("Sub")
                .input_type("crate::wire::SubRequest")
                .output_type("crate::wire::SubResponse")
                .codec_path("tonic::codec::ProstCodec")
                .server_streaming()
                .build(),
        )
        .build();

    tonic_build::manual::Builder::new().compile(&[service]);
}
